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
        DomainError::SkillNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "SKILLS_NOT_FOUND",
            "Skill not found",
            e.to_string(),
            instance,
        ),
        DomainError::NameRequired
        | DomainError::NameTooLong { .. }
        | DomainError::InvalidLevel { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "SKILLS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_404() {
        let p = map_domain_error(&DomainError::skill_not_found("abc"), "/api/skills/abc");
        assert_eq!(p.0.status, 404);
        assert_eq!(p.0.detail, "Skill not found");
        assert_eq!(p.0.code, "SKILLS_NOT_FOUND");
    }

    #[test]
    fn missing_name_is_400() {
        let p = map_domain_error(&DomainError::NameRequired, "/api/skills");
        assert_eq!(p.0.status, 400);
        assert_eq!(p.0.detail, "Name is required");
    }

    #[test]
    fn database_details_are_hidden() {
        let p = map_domain_error(&DomainError::database("no such table: skills"), "/api/skills");
        assert_eq!(p.0.status, 500);
        assert!(!p.0.detail.contains("skills"));
    }
}
