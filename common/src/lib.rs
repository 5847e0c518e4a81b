pub mod config;
pub mod logger;

use validator::ValidationErrors;

/// Joins every field-level validation message into one line, `"; "` separated.
/// Fields named in `field_order` come first, in that order; any others follow
/// sorted by name.
pub fn format_validation_errors(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(name, _)| {
        let rank = field_order
            .iter()
            .position(|f| *f == &**name)
            .unwrap_or(field_order.len());
        (rank, name.to_string())
    });

    fields
        .into_iter()
        .flat_map(|(_, errs)| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
