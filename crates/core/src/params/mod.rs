//! Typed request parameters, validated at the HTTP boundary.
//!
//! Each endpoint family has one parameter struct built from the raw form
//! fields via `from_fields`. Validation failures collect per-field messages
//! and map to a 400 response with no side effects.

mod fields;
mod normalize;
mod profile;
mod summarize;

pub use fields::FieldMap;
pub use normalize::NormalizeParams;
pub use profile::ProfileParams;
pub use summarize::{SamplingMethod, SummarizeParams};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the caller waits for the result or polls for it later.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    #[default]
    Prompt,
    Deferred,
}

impl ResponseMode {
    pub(crate) fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        match fields.first("response") {
            None | Some("") | Some("prompt") => Ok(ResponseMode::Prompt),
            Some("deferred") => Ok(ResponseMode::Deferred),
            Some(_) => Err(ValidationError::single(
                "response",
                "Permitted values for response are prompt or deferred",
            )),
        }
    }
}

/// Per-field validation failures, rendered as the 400 response body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return `Err(self)` if any field failed.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "Invalid parameters: {}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_mode_defaults_to_prompt() {
        let fields = FieldMap::new();
        assert_eq!(
            ResponseMode::from_fields(&fields).unwrap(),
            ResponseMode::Prompt
        );
    }

    #[test]
    fn test_response_mode_deferred() {
        let mut fields = FieldMap::new();
        fields.push("response", "deferred");
        assert_eq!(
            ResponseMode::from_fields(&fields).unwrap(),
            ResponseMode::Deferred
        );
    }

    #[test]
    fn test_response_mode_invalid() {
        let mut fields = FieldMap::new();
        fields.push("response", "later");
        let err = ResponseMode::from_fields(&fields).unwrap_err();
        assert!(err.errors.contains_key("response"));
    }

    #[test]
    fn test_validation_error_display() {
        let mut err = ValidationError::new();
        err.add("resource", "This field is required");
        assert!(err.to_string().contains("resource"));
    }
}
