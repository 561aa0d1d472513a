//! Payload validation helpers.
//!
//! A mandatory field is missing when it is absent or the empty string
//! (whitespace passes). Optional text fields normalize the empty string
//! to NULL on create but are stored verbatim on update.

use crate::errors::ApiError;

/// True when a mandatory text field should count as missing.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    matches!(value, None | Some(""))
}

/// Create-path normalization for optional text fields: empty becomes NULL.
#[must_use]
pub fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Collects missing mandatory fields and fails with one `ValidationError`
/// naming all of them.
#[derive(Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the field as missing when blank, otherwise yields its value.
    pub fn text(&mut self, name: &'static str, value: Option<&str>) -> String {
        if is_blank(value) {
            self.missing.push(name);
            String::new()
        } else {
            value.unwrap_or_default().to_string()
        }
    }

    /// Records the field as missing when absent. Any supplied number,
    /// including zero, is accepted.
    pub fn number(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        match value {
            Some(number) => number,
            None => {
                self.missing.push(name);
                0.0
            }
        }
    }

    /// Succeeds only if every recorded field was present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] listing the missing fields.
    pub fn check(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.missing))
        }
    }
}

/// Parses a path identifier. Anything that is not a well-formed integer is
/// rejected before any storage access.
///
/// # Errors
///
/// Returns [`ApiError::InvalidIdentifier`].
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::InvalidIdentifier)
}
