use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::contract::model::{Level, NewSkill, Skill, SkillPatch};
use crate::domain::error::DomainError;

/// REST DTO for skill representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new skill. Unknown fields (including `isCompleted`) are ignored.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateSkillReq {
    pub name: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub resources: Option<Vec<String>>,
}

/// REST DTO for updating a skill. Only these fields are honoured.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSkillReq {
    pub name: Option<String>,
    /// `null` clears the category.
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    pub level: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub resources: Option<Vec<String>>,
    pub is_completed: Option<bool>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn parse_level(raw: Option<String>) -> Result<Option<Level>, DomainError> {
    raw.map(|l| Level::parse(l.trim()).ok_or_else(|| DomainError::invalid_level(l)))
        .transpose()
}

impl From<Skill> for SkillDto {
    fn from(skill: Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name,
            category: skill.category,
            level: skill.level,
            description: skill.description,
            resources: skill.resources,
            created_by: skill.created_by,
            is_completed: skill.is_completed,
            created_at: skill.created_at,
            updated_at: skill.updated_at,
        }
    }
}

impl TryFrom<CreateSkillReq> for NewSkill {
    type Error = DomainError;

    fn try_from(req: CreateSkillReq) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name.unwrap_or_default(),
            category: req.category,
            level: parse_level(req.level)?,
            description: req.description,
            resources: req.resources.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateSkillReq> for SkillPatch {
    type Error = DomainError;

    fn try_from(req: UpdateSkillReq) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            category: req.category,
            level: parse_level(req.level)?,
            description: req.description,
            resources: req.resources,
            is_completed: req.is_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let req: UpdateSkillReq =
            serde_json::from_value(json!({"category": null, "isCompleted": true})).unwrap();
        assert_eq!(req.category, Some(None));
        assert_eq!(req.description, None);
        assert_eq!(req.is_completed, Some(true));
    }

    #[test]
    fn update_ignores_fields_outside_whitelist() {
        let req: UpdateSkillReq =
            serde_json::from_value(json!({"createdBy": "x", "_id": "y", "name": "Go"})).unwrap();
        let patch = SkillPatch::try_from(req).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Go"));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let req = CreateSkillReq {
            name: Some("Rust".into()),
            level: Some("expert".into()),
            ..Default::default()
        };
        let err = NewSkill::try_from(req).unwrap_err();
        assert!(matches!(err, DomainError::InvalidLevel { .. }));
    }

    #[test]
    fn skill_dto_uses_wire_names() {
        let now = Utc::now();
        let dto = SkillDto::from(Skill {
            id: Uuid::nil(),
            name: "Rust".into(),
            category: None,
            level: Level::Advanced,
            description: Some("systems".into()),
            resources: vec!["https://doc.rust-lang.org/book/".into()],
            created_by: Some(Uuid::nil()),
            is_completed: true,
            created_at: now,
            updated_at: now,
        });
        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["_id"], Uuid::nil().to_string());
        assert_eq!(v["level"], "advanced");
        assert_eq!(v["isCompleted"], true);
        assert_eq!(v["createdBy"], Uuid::nil().to_string());
        assert!(v.get("category").is_none());
        assert!(v["createdAt"].is_string());
    }
}
