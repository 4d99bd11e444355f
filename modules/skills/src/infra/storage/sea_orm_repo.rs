//! SeaORM-backed repository implementation for the domain port.

use anyhow::Context;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::contract::model::{Level, Skill};
use crate::domain::repo::SkillsRepository;
use crate::infra::storage::entity::{
    ActiveModel as SkillAM, Column, Entity as SkillEntity, Model as SkillModel,
};

/// SeaORM repository impl, generic over the connection.
pub struct SeaOrmSkillsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmSkillsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl TryFrom<SkillModel> for Skill {
    type Error = anyhow::Error;

    fn try_from(m: SkillModel) -> anyhow::Result<Self> {
        let level = Level::parse(&m.level).with_context(|| format!("unknown level '{}'", m.level))?;
        let resources: Vec<String> =
            serde_json::from_str(&m.resources).context("stored resources are not a JSON array")?;
        Ok(Skill {
            id: m.id,
            name: m.name,
            category: m.category,
            level,
            description: m.description,
            resources,
            created_by: m.created_by,
            is_completed: m.is_completed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

fn to_active_model(s: Skill) -> anyhow::Result<SkillAM> {
    let resources = serde_json::to_string(&s.resources).context("serialize resources")?;
    Ok(SkillAM {
        id: Set(s.id),
        name: Set(s.name),
        category: Set(s.category),
        level: Set(s.level.as_str().to_string()),
        description: Set(s.description),
        resources: Set(resources),
        created_by: Set(s.created_by),
        is_completed: Set(s.is_completed),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    })
}

#[async_trait::async_trait]
impl<C> SkillsRepository for SeaOrmSkillsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list(&self) -> anyhow::Result<Vec<Skill>> {
        let rows = SkillEntity::find()
            .order_by_desc(Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list query failed")?;
        rows.into_iter().map(Skill::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Skill>> {
        let found = SkillEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(Skill::try_from).transpose()
    }

    async fn insert(&self, skill: Skill) -> anyhow::Result<()> {
        let m = to_active_model(skill)?;
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn update(&self, skill: Skill) -> anyhow::Result<()> {
        let mut m = to_active_model(skill)?;
        // creation metadata never changes
        m.created_by = sea_orm::ActiveValue::NotSet;
        m.created_at = sea_orm::ActiveValue::NotSet;
        let _ = m.update(&self.conn).await.context("update failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = SkillEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
