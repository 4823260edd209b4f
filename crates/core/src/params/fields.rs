//! Raw form fields, as received from multipart or urlencoded bodies.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::ValidationError;

/// An ordered multimap of raw form fields. List-valued fields accept both
/// repeated keys and comma-separated values.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw value for a field.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    /// First raw value for a field, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|s| s.as_str())
    }

    /// First non-empty value for a field.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.first(name).filter(|s| !s.is_empty())
    }

    /// All values for a list field, splitting each raw value on commas and
    /// dropping empties.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .flat_map(|v| v.split(','))
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Boolean field: "true"/"1"/"yes"/"on" are truthy, anything else false.
    pub fn boolean(&self, name: &str) -> bool {
        self.non_empty(name)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    /// Parse an optional field, collecting a validation error on bad input.
    pub fn parsed<T: FromStr>(
        &self,
        name: &str,
        errors: &mut ValidationError,
    ) -> Option<T> {
        let raw = self.non_empty(name)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.add(name, "Invalid value");
                None
            }
        }
    }

    /// Parse a list field of numbers, collecting a validation error on bad
    /// entries.
    pub fn parsed_list<T: FromStr>(
        &self,
        name: &str,
        errors: &mut ValidationError,
    ) -> Vec<T> {
        let mut out = Vec::new();
        for raw in self.list(name) {
            match raw.parse::<T>() {
                Ok(value) => out.push(value),
                Err(_) => {
                    errors.add(name, "Invalid value");
                    return Vec::new();
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_non_empty() {
        let mut fields = FieldMap::new();
        fields.push("crs", "");
        assert_eq!(fields.first("crs"), Some(""));
        assert_eq!(fields.non_empty("crs"), None);
        assert_eq!(fields.first("missing"), None);
    }

    #[test]
    fn test_list_splits_commas_and_repeats() {
        let mut fields = FieldMap::new();
        fields.push("columns", "name, phone");
        fields.push("columns", "address");
        assert_eq!(fields.list("columns"), vec!["name", "phone", "address"]);
    }

    #[test]
    fn test_boolean() {
        let mut fields = FieldMap::new();
        fields.push("wkt_normalization", "true");
        fields.push("column_name_normalization", "no");
        assert!(fields.boolean("wkt_normalization"));
        assert!(!fields.boolean("column_name_normalization"));
        assert!(!fields.boolean("absent"));
    }

    #[test]
    fn test_parsed_collects_errors() {
        let mut fields = FieldMap::new();
        fields.push("width", "not-a-number");
        let mut errors = ValidationError::new();
        let width: Option<u32> = fields.parsed("width", &mut errors);
        assert_eq!(width, None);
        assert!(errors.errors.contains_key("width"));
    }

    #[test]
    fn test_parsed_list() {
        let mut fields = FieldMap::new();
        fields.push("n_buckets", "5,10");
        let mut errors = ValidationError::new();
        let buckets: Vec<u32> = fields.parsed_list("n_buckets", &mut errors);
        assert_eq!(buckets, vec![5, 10]);
        assert!(errors.is_empty());
    }
}
