//! # Panel Initialization
//!
//! Wires the statically configured medical panel: three LLM-backed
//! specialists plus the multidisciplinary team.

use anyhow::Context;
use std::sync::Arc;

use crate::skills::{SpecialistSkill, Specialty, TeamSkill, TEAM_IDENTITY};

use super::coordinator::CoordinatorConfig;
use super::evaluator::{SharedSpecialist, SharedSynthesis};
use super::pipeline::AnalysisPipeline;

/// The three specialists, in panel order
pub fn medical_specialists(config: &CoordinatorConfig) -> Vec<SharedSpecialist> {
    Specialty::all()
        .into_iter()
        .map(|specialty| {
            let model = config.model_config_for(specialty.identity());
            Arc::new(SpecialistSkill::new(specialty, model)) as SharedSpecialist
        })
        .collect()
}

/// The multidisciplinary team synthesis
pub fn medical_team(config: &CoordinatorConfig) -> SharedSynthesis {
    Arc::new(TeamSkill::new(config.model_config_for(TEAM_IDENTITY)))
}

/// Build the production pipeline
pub fn medical_pipeline(config: &CoordinatorConfig) -> anyhow::Result<AnalysisPipeline> {
    let specialists = medical_specialists(config);
    for specialist in &specialists {
        tracing::info!(specialist = specialist.identity(), "Specialist configured");
    }
    AnalysisPipeline::new(specialists, medical_team(config), config)
        .context("Failed to assemble the medical panel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LlmProvider;

    #[test]
    fn test_medical_pipeline_panel() {
        let pipeline = medical_pipeline(&CoordinatorConfig::default()).unwrap();
        assert_eq!(
            pipeline.specialist_identities(),
            vec!["cardiologist", "psychologist", "pulmonologist"]
        );
    }

    #[test]
    fn test_team_model_override() {
        let mut config = CoordinatorConfig::default();
        config
            .per_specialist_providers
            .insert(TEAM_IDENTITY.to_string(), LlmProvider::Gemini);
        let team = config.model_config_for(TEAM_IDENTITY);
        assert_eq!(team.provider, LlmProvider::Gemini);
        assert_eq!(team.model, LlmProvider::Gemini.default_model());
    }
}
