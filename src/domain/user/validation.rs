//! User validation utilities
//!
//! The update schema is shared by the API handlers and the admin client so
//! both sides apply the same rules to the same fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use super::entity::{UserChanges, UserRole};
use crate::domain::error::FieldErrors;

/// Errors that can occur when parsing user values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Invalid user ID: '{0}'")]
    InvalidId(String),

    #[error("Invalid role: '{0}'. Expected 'client' or 'admin'")]
    InvalidRole(String),
}

pub const NAME_NOT_STRING: &str = "The name must be a string.";
pub const NAME_TOO_LONG: &str = "The name may not be greater than 255 characters.";
pub const EMAIL_INVALID: &str = "The email must be a valid email address.";
pub const EMAIL_TAKEN: &str = "The email has already been taken.";
pub const ROLE_INVALID: &str = "The selected role is invalid.";

/// Partial update of a user
///
/// Rules:
/// - `name`: at most 255 characters
/// - `email`: a valid address (uniqueness is enforced by the store)
/// - `role`: `client` or `admin`
///
/// Absent fields are not validated and not changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// Validate a raw JSON body. Fields of the wrong type (including `null`)
    /// are reported alongside the rule failures of the well-typed ones;
    /// unknown keys are ignored.
    pub fn from_json(body: &Map<String, Value>) -> Result<UserChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let request = Self {
            name: string_field(body, "name", NAME_NOT_STRING, &mut errors),
            email: string_field(body, "email", EMAIL_INVALID, &mut errors),
            role: string_field(body, "role", ROLE_INVALID, &mut errors),
        };

        match request.check() {
            Ok(changes) if errors.is_empty() => Ok(changes),
            Ok(_) => Err(errors),
            Err(rule_errors) => {
                errors.extend(rule_errors);
                Err(errors)
            }
        }
    }

    /// Validate every supplied field, collecting all failures
    pub fn check(&self) -> Result<UserChanges, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let role = match self.role.as_deref().map(str::parse::<UserRole>) {
            Some(Ok(role)) => Some(role),
            Some(Err(_)) => {
                errors.add("role", ROLE_INVALID);
                None
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UserChanges {
            name: self.name.clone(),
            email: self.email.clone(),
            role,
        })
    }
}

fn string_field(
    body: &Map<String, Value>,
    field: &str,
    type_message: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match body.get(field) {
        None => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.add(field, type_message);
            None
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field));
                fields.add(field.to_string(), message);
            }
        }

        fields
    }
}
