use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum AccountsError {
    #[error("User not found: {id}")]
    NotFound { id: Uuid },

    #[error("User with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Internal error")]
    Internal,
}

impl AccountsError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(email: String) -> Self {
        Self::Conflict { email }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for AccountsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            UserAlreadyExists { email } => Self::conflict(email),
            e @ (MissingRegistrationFields
            | InvalidEmail { .. }
            | PasswordTooShort { .. }
            | NameTooLong { .. }
            | InvalidProgress { .. }) => Self::validation(e.to_string()),
            e @ (InvalidCredentials | MissingToken | InvalidToken) => {
                Self::unauthorized(e.to_string())
            }
            Database { .. } | Internal { .. } => Self::internal(),
        }
    }
}
