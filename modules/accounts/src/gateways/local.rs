use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::AccountsApi, error::AccountsError, model::User};
use crate::domain::service::Service;

/// Local implementation of the AccountsApi trait that delegates to the domain service
pub struct AccountsLocalClient {
    service: Arc<Service>,
}

impl AccountsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AccountsApi for AccountsLocalClient {
    async fn get_user(&self, id: Uuid) -> Result<User, AccountsError> {
        self.service.get_user(id).await.map_err(AccountsError::from)
    }

    async fn resolve_session(&self, token: Option<&str>) -> Result<User, AccountsError> {
        self.service
            .resolve_session(token)
            .await
            .map_err(AccountsError::from)
    }
}
