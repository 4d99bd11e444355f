use serde::{Deserialize, Serialize};

/// Configuration for the accounts module (`modules.accounts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Fixed UTC offset (minutes east) that decides where a streak day starts.
    #[serde(default)]
    pub day_offset_minutes: i32,
    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            min_password_length: default_min_password_length(),
            max_name_length: default_max_name_length(),
            day_offset_minutes: 0,
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

/// Session token + cookie settings, handed to the issuer and cookie writer at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// HMAC secret for session tokens. Empty means a random per-process secret.
    pub secret: String,
    /// Add `Secure` to the cookie.
    pub secure: bool,
    /// `SameSite=None` (frontend on another origin) instead of `SameSite=Lax`.
    pub same_site_cross_origin: bool,
    pub max_age_seconds: i64,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            secure: false,
            same_site_cross_origin: false,
            max_age_seconds: 30 * 24 * 60 * 60,
            cookie_name: "token".to_string(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordHashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP baseline)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

fn default_min_password_length() -> usize {
    6
}

fn default_max_name_length() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: AccountsConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.min_password_length, 6);
        assert_eq!(cfg.session.cookie_name, "token");
        assert_eq!(cfg.session.max_age_seconds, 2_592_000);
        assert!(!cfg.session.secure);
        assert_eq!(cfg.day_offset_minutes, 0);
    }

    #[test]
    fn nested_session_section_is_partial() {
        let cfg: AccountsConfig = serde_json::from_value(json!({
            "session": {"secure": true, "same_site_cross_origin": true},
            "day_offset_minutes": -300
        }))
        .unwrap();
        assert!(cfg.session.secure);
        assert!(cfg.session.same_site_cross_origin);
        assert_eq!(cfg.session.cookie_name, "token");
        assert_eq!(cfg.day_offset_minutes, -300);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_value::<AccountsConfig>(json!({"production": true})).is_err());
    }
}
