use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::SkillsApi, error::SkillsError, model::Skill};
use crate::domain::service::Service;

/// Local implementation of the SkillsApi trait that delegates to the domain service
pub struct SkillsLocalClient {
    service: Arc<Service>,
}

impl SkillsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SkillsApi for SkillsLocalClient {
    async fn list_skills(&self) -> Result<Vec<Skill>, SkillsError> {
        self.service.list_skills().await.map_err(SkillsError::from)
    }

    async fn get_skill(&self, id: Uuid) -> Result<Skill, SkillsError> {
        self.service.get_skill(id).await.map_err(SkillsError::from)
    }
}
