use uuid::Uuid;

use accounts::contract::{error::AccountsError, model::*};
use accounts::domain::error::DomainError;

#[test]
fn test_contract_models() {
    assert_eq!(Role::default(), Role::User);
    assert_eq!(Role::parse("admin"), Some(Role::Admin));
    assert_eq!(Role::parse("root"), None);
    assert_eq!(Role::Admin.as_str(), "admin");

    let entry: SkillProgress = serde_json::from_str(r#"{"percent": 55}"#).unwrap();
    assert_eq!(entry.status, ProgressStatus::NotStarted);
    assert_eq!(entry.percent, 55);
    assert_eq!(entry.notes, None);

    let patch = ProfilePatch {
        name: Some("Ada".to_string()),
        ..Default::default()
    };
    assert_eq!(patch.name.as_deref(), Some("Ada"));
    assert!(patch.email.is_none());
    assert!(patch.progress.is_none());
}

#[test]
fn test_contract_errors_from_domain() {
    let id = Uuid::new_v4();
    match AccountsError::from(DomainError::user_not_found(id)) {
        AccountsError::NotFound { id: error_id } => assert_eq!(error_id, id),
        other => panic!("Expected NotFound error, got {other:?}"),
    }

    match AccountsError::from(DomainError::user_already_exists("a@b.co")) {
        AccountsError::Conflict { email } => assert_eq!(email, "a@b.co"),
        other => panic!("Expected Conflict error, got {other:?}"),
    }

    match AccountsError::from(DomainError::MissingRegistrationFields) {
        AccountsError::Validation { message } => {
            assert_eq!(message, "Please provide name, email, and password")
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }

    match AccountsError::from(DomainError::MissingToken) {
        AccountsError::Unauthorized { message } => assert_eq!(message, "Not authorized, no token"),
        other => panic!("Expected Unauthorized error, got {other:?}"),
    }

    // internal details never cross the module boundary
    let err = AccountsError::from(DomainError::database("disk I/O error"));
    assert!(matches!(err, AccountsError::Internal));
    assert_eq!(err.to_string(), "Internal error");
}
