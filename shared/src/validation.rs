//! Input validation helpers
//!
//! Field rules live on the request types as `validator` derives; this module
//! turns their failures into a single message suitable for an API response.

use validator::ValidationErrors;

/// Flatten validation errors into one human-readable message
///
/// Fields are listed in alphabetical order so the message is stable.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), reasons)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    if fields.is_empty() {
        return "Invalid request body".to_string();
    }

    let parts: Vec<String> = fields
        .into_iter()
        .map(|(field, reasons)| format!("{} is invalid ({})", field, reasons.join(", ")))
        .collect();
    parts.join("; ")
}

/// Reject strings that are empty once surrounding whitespace is removed
pub fn require_non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be blank", field));
    }
    Ok(())
}
