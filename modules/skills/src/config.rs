use serde::{Deserialize, Serialize};

/// Configuration for the skills module (`modules.skills`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillsConfig {
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_max_name_length() -> usize {
    200
}
