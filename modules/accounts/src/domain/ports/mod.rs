//! Output ports of the accounts domain. Implementations live in `infra`.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use uuid::Uuid;

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    /// `Ok(false)` for a wrong password; `Err` only for a malformed stored hash.
    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Issues and verifies signed session tokens.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user_id: Uuid, issued_at: chrono::DateTime<chrono::Utc>)
        -> anyhow::Result<String>;
    /// Returns the user id the token was issued for.
    fn verify(&self, token: &str) -> anyhow::Result<Uuid>;
}
