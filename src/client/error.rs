//! Errors surfaced by the admin client

use thiserror::Error;

use crate::domain::FieldErrors;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer from the API, with its error envelope when present
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        fields: FieldErrors,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// HTTP status for API failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message for operator notices, field messages included
    pub fn describe(&self) -> String {
        match self {
            Self::Status {
                message, fields, ..
            } if !fields.is_empty() => format!("{} ({})", message, fields),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
