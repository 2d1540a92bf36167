//! Structural request validation.
//!
//! Shape checks happen here, before the domain is invoked; the domain only
//! ever sees well-formed input. Failures are `invalid_request` with a
//! `field` detail so clients can point at the offending input.

use serde_json::json;

use crate::domain::Error;

/// Reject blank or missing text for a required field.
///
/// # Errors
///
/// [`Error::invalid_request`] naming the field when the value is blank.
pub fn require_text(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(
            Error::invalid_request(format!("{field} must not be blank"))
                .with_details(json!({ "field": field })),
        );
    }
    Ok(trimmed.to_owned())
}

/// Normalise an optional text field: blank collapses to absent.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
