use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{error::SkillsError, model::Skill};

/// Public API trait for the skills module that other modules can use
#[async_trait]
pub trait SkillsApi: Send + Sync {
    /// All skills, newest first
    async fn list_skills(&self) -> Result<Vec<Skill>, SkillsError>;

    async fn get_skill(&self, id: Uuid) -> Result<Skill, SkillsError>;
}
