//! # Medical Skills
//!
//! LLM-backed evaluators for the panel.
//!
//! - `SpecialistSkill` - one domain perspective (cardiology, psychology, pulmonology)
//! - `TeamSkill` - multidisciplinary synthesis over every specialist report

pub mod llm_helpers;
pub mod prompts;

pub mod specialist_skill;
pub mod team_skill;

pub use specialist_skill::{SpecialistOpinion, SpecialistSkill, Specialty};
pub use team_skill::{HealthIssue, TeamAssessment, TeamSkill, TEAM_IDENTITY};
