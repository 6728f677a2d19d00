use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-level validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Build from a single field/message pair
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Merge another set of errors into this one
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First message overall, used as the headline of a validation failure
    pub fn first_message(&self) -> Option<&str> {
        self.0
            .values()
            .next()
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Conflict on {field}: {message}")]
    Conflict { field: String, message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Field errors carried by a validation failure or a uniqueness conflict
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Conflict { field, message } => Some(FieldErrors::single(field, message)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User 42 not found");
        assert_eq!(error.to_string(), "Not found: User 42 not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("email", "The email must be a valid email address.");
        assert_eq!(
            error.to_string(),
            "Validation error: email: The email must be a valid email address."
        );
    }

    #[test]
    fn test_conflict_exposes_field_errors() {
        let error = DomainError::conflict("email", "The email has already been taken.");
        let fields = error.field_errors().unwrap();

        assert_eq!(
            fields.get("email"),
            Some(&["The email has already been taken.".to_string()][..])
        );
    }

    #[test]
    fn test_field_errors_accumulate() {
        let mut errors = FieldErrors::new();
        errors.add("name", "too long");
        errors.add("role", "invalid");
        errors.add("name", "not a string");

        assert_eq!(errors.get("name").unwrap().len(), 2);
        assert!(errors.contains("role"));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "role"]);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_extend_merges_messages_per_field() {
        let mut errors = FieldErrors::single("name", "too long");
        let mut other = FieldErrors::single("name", "not a string");
        other.add("email", "taken");

        errors.extend(other);

        assert_eq!(
            errors.get("name").unwrap(),
            &["too long".to_string(), "not a string".to_string()]
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "name"]);
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let errors = FieldErrors::single("role", "The selected role is invalid.");
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(json["role"][0], "The selected role is invalid.");
    }
}
