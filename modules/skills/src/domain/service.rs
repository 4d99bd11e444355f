use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewSkill, Skill, SkillPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::SkillsRepository;

/// Domain service for the skill catalogue.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn SkillsRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 200,
        }
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

/// Trimmed value, `None` when blank.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Skill ids arrive as path text; anything that is not a UUID cannot exist.
pub fn parse_skill_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::skill_not_found(raw))
}

impl Service {
    pub fn new(repo: Arc<dyn SkillsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "skills.service.list_skills", skip(self))]
    pub async fn list_skills(&self) -> Result<Vec<Skill>, DomainError> {
        let skills = self.repo.list().await.map_err(db_err)?;
        debug!(count = skills.len(), "Listed skills");
        Ok(skills)
    }

    #[instrument(name = "skills.service.get_skill", skip(self), fields(skill_id = %id))]
    pub async fn get_skill(&self, id: Uuid) -> Result<Skill, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::skill_not_found(id.to_string()))
    }

    #[instrument(
        name = "skills.service.create_skill",
        skip(self, new_skill),
        fields(created_by = ?created_by)
    )]
    pub async fn create_skill(
        &self,
        new_skill: NewSkill,
        created_by: Option<Uuid>,
    ) -> Result<Skill, DomainError> {
        info!("Creating new skill");

        let name = self.validate_name(&new_skill.name)?;
        let now = Utc::now();
        let skill = Skill {
            id: Uuid::new_v4(),
            name,
            category: clean(new_skill.category),
            level: new_skill.level.unwrap_or_default(),
            description: new_skill.description,
            resources: new_skill.resources,
            created_by,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(skill.clone()).await.map_err(db_err)?;

        info!(skill_id = %skill.id, "Successfully created skill");
        Ok(skill)
    }

    #[instrument(name = "skills.service.update_skill", skip(self, patch), fields(skill_id = %id))]
    pub async fn update_skill(&self, id: Uuid, patch: SkillPatch) -> Result<Skill, DomainError> {
        info!("Updating skill");

        let mut skill = self.get_skill(id).await?;

        if let Some(name) = patch.name {
            skill.name = self.validate_name(&name)?;
        }
        if let Some(category) = patch.category {
            skill.category = clean(category);
        }
        if let Some(level) = patch.level {
            skill.level = level;
        }
        if let Some(description) = patch.description {
            skill.description = description;
        }
        if let Some(resources) = patch.resources {
            skill.resources = resources;
        }
        if let Some(is_completed) = patch.is_completed {
            skill.is_completed = is_completed;
        }
        skill.updated_at = Utc::now();

        self.repo.update(skill.clone()).await.map_err(db_err)?;

        info!("Successfully updated skill");
        Ok(skill)
    }

    #[instrument(name = "skills.service.delete_skill", skip(self), fields(skill_id = %id))]
    pub async fn delete_skill(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting skill");

        if !self.repo.delete(id).await.map_err(db_err)? {
            return Err(DomainError::skill_not_found(id.to_string()));
        }

        info!("Successfully deleted skill");
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<String, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::NameRequired);
        }
        let len = name.chars().count();
        if len > self.config.max_name_length {
            return Err(DomainError::name_too_long(len, self.config.max_name_length));
        }
        Ok(name.to_string())
    }
}
