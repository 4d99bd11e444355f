use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Please provide name, email, and password")]
    MissingRegistrationFields,

    #[error("Please provide a valid email address")]
    InvalidEmail { email: String },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Name too long: {len} characters (max: {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("User already exists")]
    UserAlreadyExists { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, token failed")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound { id: Uuid },

    #[error("Invalid progress: {message}")]
    InvalidProgress { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn user_already_exists(email: impl Into<String>) -> Self {
        Self::UserAlreadyExists {
            email: email.into(),
        }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn password_too_short(min: usize) -> Self {
        Self::PasswordTooShort { min }
    }

    pub fn name_too_long(len: usize, max: usize) -> Self {
        Self::NameTooLong { len, max }
    }

    pub fn invalid_progress(message: impl Into<String>) -> Self {
        Self::InvalidProgress {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Server-side failure, as opposed to a rejected request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_and_internal_failures_are_internal() {
        assert!(DomainError::database("disk I/O error").is_internal());
        assert!(DomainError::internal("hashing failed").is_internal());

        assert!(!DomainError::InvalidCredentials.is_internal());
        assert!(!DomainError::user_already_exists("a@b.co").is_internal());
        assert!(!DomainError::MissingRegistrationFields.is_internal());
        assert!(!DomainError::InvalidToken.is_internal());
        assert!(!DomainError::user_not_found(Uuid::new_v4()).is_internal());
    }
}
