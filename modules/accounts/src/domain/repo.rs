use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::User;

/// Stored account: the public user plus its credential.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;
    /// Load a user by (normalized) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    /// Check uniqueness by email.
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed record.
    ///
    /// Service computes id/timestamps/validation; repo persists.
    async fn insert(&self, record: UserRecord) -> anyhow::Result<()>;
    /// Update profile fields (name, email, password hash, progress, updated_at).
    ///
    /// Streak fields are left alone; they only move through `update_streak`.
    async fn update_profile(&self, record: UserRecord) -> anyhow::Result<()>;
    /// Compare-and-set the streak state.
    ///
    /// Writes only if the stored `last_active_date` still equals `expected_last`.
    /// Returns false when another writer got there first (or the user is gone).
    async fn update_streak(
        &self,
        id: Uuid,
        expected_last: Option<DateTime<Utc>>,
        current_streak: u32,
        last_active_date: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
}
