use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use util::countdown::{TimeLeft, time_left};

/// Calls `on_tick` every `period` with the time left until `deadline`. Stops
/// after reporting zero, or as soon as `cancel` fires. Returns the last value
/// reported.
pub async fn run_countdown<F>(
    deadline: &str,
    period: Duration,
    cancel: CancellationToken,
    mut on_tick: F,
) -> TimeLeft
where
    F: FnMut(TimeLeft),
{
    let mut ticker = tokio::time::interval(period);
    let mut last = TimeLeft::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return last,
            _ = ticker.tick() => {
                last = time_left(deadline, Utc::now());
                on_tick(last);
                if last.is_zero() {
                    return last;
                }
            }
        }
    }
}
