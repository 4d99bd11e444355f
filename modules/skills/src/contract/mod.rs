pub mod client;
pub mod error;
pub mod model;

pub use client::SkillsApi;
pub use error::SkillsError;
pub use model::{Level, NewSkill, Skill, SkillPatch};
