use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::AccountsError, model::User};

/// Public API trait for the accounts module that other modules can use
#[async_trait]
pub trait AccountsApi: Send + Sync {
    /// Get a user by ID
    async fn get_user(&self, id: Uuid) -> Result<User, AccountsError>;

    /// Resolve a session token to its user.
    ///
    /// `None` means the request carried no token at all.
    async fn resolve_session(&self, token: Option<&str>) -> Result<User, AccountsError>;
}
