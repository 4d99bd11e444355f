use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Level::Beginner),
            "intermediate" => Some(Level::Intermediate),
            "advanced" => Some(Level::Advanced),
            _ => None,
        }
    }
}

/// A skill in the shared catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub level: Level,
    pub description: Option<String>,
    pub resources: Vec<String>,
    /// The account that created the skill.
    pub created_by: Option<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new skill. Completion always starts as false.
#[derive(Debug, Clone, Default)]
pub struct NewSkill {
    pub name: String,
    pub category: Option<String>,
    pub level: Option<Level>,
    pub description: Option<String>,
    pub resources: Vec<String>,
}

/// Partial update. For `category` and `description`, `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub category: Option<Option<String>>,
    pub level: Option<Level>,
    pub description: Option<Option<String>>,
    pub resources: Option<Vec<String>>,
    pub is_completed: Option<bool>,
}
