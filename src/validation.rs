//! Field-keyed validation results shared by tours, inquiries and users.
//!
//! Validators in this crate never stop at the first problem. They collect
//! every violated field into [`FieldErrors`] so a form can show all messages
//! at once.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Map of field name to a human-readable message.
///
/// Ordered so JSON output and test assertions are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record `message` under `field` when `value` is empty.
    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.is_empty() {
            self.add(field, message);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

/// Malformed or missing input, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    /// Error carrying a single field message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self(errors)
    }

    pub fn fields(&self) -> &FieldErrors {
        &self.0
    }
}

/// Outcome of a full-form validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub field_errors: FieldErrors,
}

impl ValidationResult {
    pub fn from_errors(field_errors: FieldErrors) -> Self {
        Self {
            ok: field_errors.is_empty(),
            field_errors,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        self.field_errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_records_only_empty_values() {
        let mut errors = FieldErrors::new();
        errors.require("title", "", "Tour title is required.");
        errors.require("summary", "Sunny", "Tour summary is required.");

        assert!(errors.contains("title"));
        assert!(!errors.contains("summary"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required.");
        errors.add("email", "Email is invalid.");
        assert_eq!(errors.get("email"), Some("Email is required."));
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let err = ValidationError::single("nights", "bad");
        assert_eq!(err.to_string(), "1 field(s) failed validation");
        assert!(err.fields().contains("nights"));
    }

    #[test]
    fn test_validation_result_ok_flag() {
        let result = ValidationResult::from_errors(FieldErrors::new());
        assert!(result.ok);

        let mut errors = FieldErrors::new();
        errors.add("price", "Price is required.");
        let result = ValidationResult::from_errors(errors);
        assert!(!result.ok);
        assert!(result.into_result().is_err());
    }
}
