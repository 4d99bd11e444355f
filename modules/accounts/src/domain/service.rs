use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{NewUser, ProfilePatch, Progress, Role, User};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, PasswordHasher, SessionIssuer};
use crate::domain::repo::{UserRecord, UsersRepository};
use crate::domain::streak::StreakEvaluator;

/// Domain service with business rules for accounts, sessions and streaks.
/// Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionIssuer>,
    clock: Arc<dyn Clock>,
    streaks: StreakEvaluator,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_length: usize,
    pub max_name_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            max_name_length: 100,
        }
    }
}

/// Collaborators the service is wired with.
pub struct ServiceDeps {
    pub repo: Arc<dyn UsersRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sessions: Arc<dyn SessionIssuer>,
    pub clock: Arc<dyn Clock>,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Service {
    pub fn new(deps: ServiceDeps, streaks: StreakEvaluator, config: ServiceConfig) -> Self {
        Self {
            repo: deps.repo,
            hasher: deps.hasher,
            sessions: deps.sessions,
            clock: deps.clock,
            streaks,
            config,
        }
    }

    #[instrument(name = "accounts.service.register", skip(self, new_user), fields(email = %new_user.email.trim()))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        let name = new_user.name.trim().to_string();
        let email = normalize_email(&new_user.email);
        if name.is_empty() || email.is_empty() || new_user.password.is_empty() {
            return Err(DomainError::MissingRegistrationFields);
        }
        self.validate_name(&name)?;
        self.validate_email(&email)?;
        self.validate_password(&new_user.password)?;

        if self.repo.email_exists(&email).await.map_err(db_err)? {
            return Err(DomainError::user_already_exists(email));
        }

        let password_hash = self
            .hasher
            .hash(&new_user.password)
            .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))?;

        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            role: Role::User,
            current_streak: 1,
            last_active_date: Some(now),
            progress: Progress::new(),
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(UserRecord {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(db_err)?;

        info!(user_id = %user.id, "Successfully registered user");
        Ok(user)
    }

    #[instrument(name = "accounts.service.login", skip(self, password), fields(email = %email.trim()))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::InvalidCredentials);
        }

        let Some(record) = self.repo.find_by_email(&email).await.map_err(db_err)? else {
            debug!("Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify(password, &record.password_hash)
            .map_err(|e| DomainError::internal(format!("password verification failed: {e}")))?;
        if !matches {
            debug!(user_id = %record.user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let user = self.touch_streak(record.user).await?;
        info!(user_id = %user.id, streak = user.current_streak, "User logged in");
        Ok(user)
    }

    /// Fetch the caller's profile; counts as daily activity.
    #[instrument(name = "accounts.service.profile", skip(self), fields(user_id = %id))]
    pub async fn profile(&self, id: Uuid) -> Result<User, DomainError> {
        let user = self.get_user(id).await?;
        self.touch_streak(user).await
    }

    #[instrument(name = "accounts.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .map(|r| r.user)
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "accounts.service.update_profile", skip(self, patch), fields(user_id = %id))]
    pub async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, DomainError> {
        info!("Updating profile");

        let mut record = self
            .repo
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if let Some(name) = patch.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            self.validate_name(name)?;
            record.user.name = name.to_string();
        }

        if let Some(email) = patch
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
        {
            self.validate_email(&email)?;
            if email != record.user.email && self.repo.email_exists(&email).await.map_err(db_err)? {
                return Err(DomainError::user_already_exists(email));
            }
            record.user.email = email;
        }

        if let Some(password) = patch.password.as_deref().filter(|p| !p.is_empty()) {
            self.validate_password(password)?;
            record.password_hash = self
                .hasher
                .hash(password)
                .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))?;
        }

        if let Some(progress) = patch.progress {
            validate_progress(&progress)?;
            record.user.progress = progress;
        }

        record.user.updated_at = self.clock.now();
        let user = record.user.clone();
        self.repo.update_profile(record).await.map_err(db_err)?;

        info!("Successfully updated profile");
        Ok(user)
    }

    /// Sign a fresh session token for `user_id`.
    pub fn issue_session(&self, user_id: Uuid) -> Result<String, DomainError> {
        self.sessions
            .issue(user_id, self.clock.now())
            .map_err(|e| DomainError::internal(format!("session signing failed: {e}")))
    }

    /// Resolve a request's session token to its user.
    #[instrument(name = "accounts.service.resolve_session", skip_all)]
    pub async fn resolve_session(&self, token: Option<&str>) -> Result<User, DomainError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::MissingToken)?;

        let id = self.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            DomainError::InvalidToken
        })?;

        match self.repo.find_by_id(id).await.map_err(db_err)? {
            Some(record) => Ok(record.user),
            None => {
                debug!(user_id = %id, "Session for a user that no longer exists");
                Err(DomainError::InvalidToken)
            }
        }
    }

    /// Evaluate the streak for activity "now" and persist it when it moved.
    ///
    /// The write is a compare-and-set on the previously read `last_active_date`.
    /// When another request wins the race the user is re-read and evaluated once more;
    /// the winner's write then counts as today's credit.
    async fn touch_streak(&self, mut user: User) -> Result<User, DomainError> {
        for attempt in 0..2 {
            let update =
                self.streaks
                    .evaluate(self.clock.now(), user.last_active_date, user.current_streak);
            if !update.changed {
                return Ok(user);
            }

            let written = self
                .repo
                .update_streak(
                    user.id,
                    user.last_active_date,
                    update.current_streak,
                    update.last_active_date,
                )
                .await
                .map_err(db_err)?;

            if written {
                debug!(streak = update.current_streak, "Streak updated");
                user.current_streak = update.current_streak;
                user.last_active_date = Some(update.last_active_date);
                return Ok(user);
            }

            warn!(user_id = %user.id, attempt, "Concurrent streak update detected, re-reading");
            user = self.get_user(user.id).await?;
        }
        Ok(user)
    }

    // --- validation helpers ---

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        let well_formed = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(DomainError::invalid_email(email));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(DomainError::password_too_short(
                self.config.min_password_length,
            ));
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), DomainError> {
        let len = name.chars().count();
        if len > self.config.max_name_length {
            return Err(DomainError::name_too_long(len, self.config.max_name_length));
        }
        Ok(())
    }
}

fn validate_progress(progress: &Progress) -> Result<(), DomainError> {
    for (key, entry) in progress {
        if key.trim().is_empty() {
            return Err(DomainError::invalid_progress("skill key cannot be empty"));
        }
        if entry.percent > 100 {
            return Err(DomainError::invalid_progress(format!(
                "percent for '{key}' must be between 0 and 100"
            )));
        }
    }
    Ok(())
}
