use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::SessionIssuer;

/// JWT claims carried by the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 session tokens.
pub struct JwtSessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age_seconds: i64,
}

impl JwtSessions {
    pub fn new(secret: &[u8], max_age_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            max_age_seconds,
        }
    }
}

impl SessionIssuer for JwtSessions {
    fn issue(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + self.max_age_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).context("sign session")
    }

    fn verify(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("invalid session token")?;
        Uuid::parse_str(&data.claims.sub).context("session subject is not a user id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_verifies_to_same_user() {
        let s = JwtSessions::new(b"test-secret", 3600);
        let id = Uuid::new_v4();
        let token = s.issue(id, Utc::now()).unwrap();
        assert_eq!(s.verify(&token).unwrap(), id);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let a = JwtSessions::new(b"secret-a", 3600);
        let b = JwtSessions::new(b"secret-b", 3600);
        let token = a.issue(Uuid::new_v4(), Utc::now()).unwrap();
        assert!(b.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let s = JwtSessions::new(b"test-secret", 60);
        let token = s
            .issue(Uuid::new_v4(), Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(s.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let s = JwtSessions::new(b"test-secret", 60);
        assert!(s.verify("not.a.jwt").is_err());
    }
}
