use chrono::{DateTime, Utc};
use std::fmt;

/// Whole days/hours/minutes/seconds until the contest deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    pub fn is_zero(&self) -> bool {
        *self == TimeLeft::default()
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}天 {:02}时 {:02}分 {:02}秒",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Time remaining before `deadline` (RFC 3339). Zero once the deadline has
/// passed or when it cannot be parsed.
pub fn time_left(deadline: &str, now: DateTime<Utc>) -> TimeLeft {
    let Ok(target) = DateTime::parse_from_rfc3339(deadline) else {
        return TimeLeft::default();
    };

    let total = (target.with_timezone(&Utc) - now).num_seconds();
    if total <= 0 {
        return TimeLeft::default();
    }

    TimeLeft {
        days: total / 86_400,
        hours: (total / 3_600) % 24,
        minutes: (total / 60) % 60,
        seconds: total % 60,
    }
}
