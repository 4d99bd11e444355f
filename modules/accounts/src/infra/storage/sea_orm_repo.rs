//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can run on a `DatabaseConnection`
//! or inside a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::contract::model::{Progress, Role, User};
use crate::domain::repo::{UserRecord, UsersRepository};
use crate::infra::storage::entity::{
    ActiveModel as UserAM, Column, Entity as UserEntity, Model as UserModel,
};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl TryFrom<UserModel> for UserRecord {
    type Error = anyhow::Error;

    fn try_from(m: UserModel) -> anyhow::Result<Self> {
        let role = Role::parse(&m.role).with_context(|| format!("unknown role '{}'", m.role))?;
        let progress: Progress =
            serde_json::from_str(&m.progress).context("stored progress is not valid JSON")?;
        let current_streak = u32::try_from(m.current_streak)
            .with_context(|| format!("stored current_streak out of range: {}", m.current_streak))?;
        Ok(UserRecord {
            user: User {
                id: m.id,
                name: m.name,
                email: m.email,
                role,
                current_streak,
                last_active_date: m.last_active_date,
                progress,
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            password_hash: m.password_hash,
        })
    }
}

fn to_active_model(r: UserRecord) -> anyhow::Result<UserAM> {
    let progress = serde_json::to_string(&r.user.progress).context("serialize progress")?;
    Ok(UserAM {
        id: Set(r.user.id),
        name: Set(r.user.name),
        email: Set(r.user.email),
        password_hash: Set(r.password_hash),
        role: Set(r.user.role.as_str().to_string()),
        current_streak: Set(i64::from(r.user.current_streak)),
        last_active_date: Set(r.user.last_active_date),
        progress: Set(progress),
        created_at: Set(r.user.created_at),
        updated_at: Set(r.user.updated_at),
    })
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(UserRecord::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        found.map(UserRecord::try_from).transpose()
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, record: UserRecord) -> anyhow::Result<()> {
        let m = to_active_model(record)?;
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn update_profile(&self, record: UserRecord) -> anyhow::Result<()> {
        let mut m = to_active_model(record)?;
        // Streak columns only move through `update_streak`.
        m.current_streak = sea_orm::ActiveValue::NotSet;
        m.last_active_date = sea_orm::ActiveValue::NotSet;
        m.created_at = sea_orm::ActiveValue::NotSet;
        let _ = m.update(&self.conn).await.context("update failed")?;
        Ok(())
    }

    async fn update_streak(
        &self,
        id: Uuid,
        expected_last: Option<DateTime<Utc>>,
        current_streak: u32,
        last_active_date: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let changes = UserAM {
            current_streak: Set(i64::from(current_streak)),
            last_active_date: Set(Some(last_active_date)),
            ..Default::default()
        };

        let guard = match expected_last {
            Some(prev) => Column::LastActiveDate.eq(prev),
            None => Column::LastActiveDate.is_null(),
        };

        let res = UserEntity::update_many()
            .set(changes)
            .filter(Column::Id.eq(id))
            .filter(guard)
            .exec(&self.conn)
            .await
            .context("update_streak failed")?;
        Ok(res.rows_affected == 1)
    }
}
