use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::Skill;

/// Port for the domain layer: persistence operations the domain needs.
#[async_trait]
pub trait SkillsRepository: Send + Sync {
    /// All skills ordered by creation time, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Skill>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Skill>>;
    async fn insert(&self, skill: Skill) -> anyhow::Result<()>;
    /// Overwrite the mutable fields of an existing skill.
    async fn update(&self, skill: Skill) -> anyhow::Result<()>;
    /// Returns false if nothing was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
