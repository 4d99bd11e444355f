use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// `id` is kept as received so malformed ids read as "not found" too.
    #[error("Skill not found")]
    SkillNotFound { id: String },

    #[error("Name is required")]
    NameRequired,

    #[error("Name too long: {len} characters (max: {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid level '{value}': expected beginner, intermediate or advanced")]
    InvalidLevel { value: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn skill_not_found(id: impl Into<String>) -> Self {
        Self::SkillNotFound { id: id.into() }
    }

    pub fn name_too_long(len: usize, max: usize) -> Self {
        Self::NameTooLong { len, max }
    }

    pub fn invalid_level(value: impl Into<String>) -> Self {
        Self::InvalidLevel {
            value: value.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Server-side failure, as opposed to a rejected request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database { .. })
    }
}
