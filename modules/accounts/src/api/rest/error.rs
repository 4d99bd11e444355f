use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("urn:learnpath:error:{}", code.to_ascii_lowercase()))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::MissingRegistrationFields
        | DomainError::InvalidEmail { .. }
        | DomainError::PasswordTooShort { .. }
        | DomainError::NameTooLong { .. }
        | DomainError::InvalidProgress { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ACCOUNTS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::UserAlreadyExists { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ACCOUNTS_USER_EXISTS",
            "User already exists",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "ACCOUNTS_INVALID_CREDENTIALS",
            "Unauthorized",
            e.to_string(),
            instance,
        ),
        DomainError::MissingToken | DomainError::InvalidToken => from_parts(
            StatusCode::UNAUTHORIZED,
            "ACCOUNTS_NOT_AUTHORIZED",
            "Unauthorized",
            e.to_string(),
            instance,
        ),
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "ACCOUNTS_NOT_FOUND",
            "User not found",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
        DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "Internal error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_400_with_domain_message() {
        let p = map_domain_error(&DomainError::MissingRegistrationFields, "/api/users");
        assert_eq!(p.0.status, 400);
        assert_eq!(p.0.detail, "Please provide name, email, and password");
        assert_eq!(p.0.instance, "/api/users");
        assert_eq!(p.0.type_url, "urn:learnpath:error:accounts_validation");
    }

    #[test]
    fn duplicate_email_is_400() {
        let p = map_domain_error(&DomainError::user_already_exists("a@b.co"), "/api/users");
        assert_eq!(p.0.status, 400);
        assert_eq!(p.0.detail, "User already exists");
    }

    #[test]
    fn auth_failures_are_401() {
        for (e, msg) in [
            (DomainError::InvalidCredentials, "Invalid email or password"),
            (DomainError::MissingToken, "Not authorized, no token"),
            (DomainError::InvalidToken, "Not authorized, token failed"),
        ] {
            let p = map_domain_error(&e, "/x");
            assert_eq!(p.0.status, 401);
            assert_eq!(p.0.detail, msg);
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let p = map_domain_error(&DomainError::database("connection refused at 10.0.0.1"), "/x");
        assert_eq!(p.0.status, 500);
        assert!(!p.0.detail.contains("10.0.0.1"));
    }
}
