use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{NewUser, ProfilePatch, Progress, Role, User};

/// REST DTO for user representation. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub current_streak: u32,
    pub last_active_date: Option<DateTime<Utc>>,
    pub progress: Progress,
}

/// Registration body. Fields are optional so a missing one yields the domain message.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegisterReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginReq {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProfileReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub message: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            current_streak: user.current_streak,
            last_active_date: user.last_active_date,
            progress: user.progress,
        }
    }
}

impl From<RegisterReq> for NewUser {
    fn from(req: RegisterReq) -> Self {
        Self {
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        }
    }
}

impl From<UpdateProfileReq> for ProfilePatch {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            progress: req.progress,
        }
    }
}

// Fields redacted from request logs.
impl RegisterReq {
    pub fn redacted(&self) -> String {
        format!(
            "RegisterReq {{ name: {:?}, email: {:?}, password: <redacted> }}",
            self.name, self.email
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{ProgressStatus, SkillProgress};
    use serde_json::json;

    #[test]
    fn user_dto_uses_wire_names() {
        let now = Utc::now();
        let mut progress = Progress::new();
        progress.insert(
            "rust".into(),
            SkillProgress {
                status: ProgressStatus::InProgress,
                percent: 40,
                notes: None,
            },
        );
        let dto = UserDto::from(User {
            id: Uuid::nil(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::User,
            current_streak: 3,
            last_active_date: Some(now),
            progress,
            created_at: now,
            updated_at: now,
        });

        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["_id"], Uuid::nil().to_string());
        assert_eq!(v["role"], "user");
        assert_eq!(v["currentStreak"], 3);
        assert!(v["lastActiveDate"].is_string());
        assert_eq!(v["progress"]["rust"]["status"], "in_progress");
        assert_eq!(v["progress"]["rust"]["percent"], 40);
        assert!(v.get("password_hash").is_none());
        assert!(v.get("passwordHash").is_none());
    }

    #[test]
    fn progress_entries_default_missing_fields() {
        let req: UpdateProfileReq =
            serde_json::from_value(json!({"progress": {"sql": {}}})).unwrap();
        let entry = &req.progress.unwrap()["sql"];
        assert_eq!(entry.status, ProgressStatus::NotStarted);
        assert_eq!(entry.percent, 0);
    }

    #[test]
    fn redacted_register_hides_password() {
        let req = RegisterReq {
            name: Some("a".into()),
            email: Some("a@b.co".into()),
            password: Some("hunter22".into()),
        };
        assert!(!req.redacted().contains("hunter22"));
    }
}
