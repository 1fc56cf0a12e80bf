//! # Specialist Skill
//!
//! LLM-backed specialist evaluator. One instance per `Specialty`; the
//! specialty decides the identity and the system prompt.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::prompts;
use crate::swarm::SpecialistEvaluator;
use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The specialties on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    Cardiologist,
    Psychologist,
    Pulmonologist,
}

impl Specialty {
    /// Panel order
    pub fn all() -> [Specialty; 3] {
        [
            Specialty::Cardiologist,
            Specialty::Psychologist,
            Specialty::Pulmonologist,
        ]
    }

    /// Stable identity used as the report key
    pub fn identity(&self) -> &'static str {
        match self {
            Specialty::Cardiologist => "cardiologist",
            Specialty::Psychologist => "psychologist",
            Specialty::Pulmonologist => "pulmonologist",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Psychologist => "Psychologist",
            Specialty::Pulmonologist => "Pulmonologist",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Specialty::Cardiologist => prompts::CARDIOLOGIST,
            Specialty::Psychologist => prompts::PSYCHOLOGIST,
            Specialty::Pulmonologist => prompts::PULMONOLOGIST,
        }
    }
}

/// Structured opinion returned by the model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct SpecialistOpinion {
    /// Facts from the report relevant to this specialty
    pub findings: Vec<String>,
    /// Possible conditions, most likely first
    pub possible_conditions: Vec<String>,
    /// Recommended tests, monitoring or treatment
    pub recommended_next_steps: Vec<String>,
    /// Short prose assessment
    pub assessment: String,
}

impl SpecialistOpinion {
    /// Render as the plain-text report the pipeline carries
    pub fn to_report(&self, specialty: Specialty) -> String {
        let mut out = format!("{} assessment\n\n{}\n", specialty.display_name(), self.assessment.trim());
        push_section(&mut out, "Findings", &self.findings);
        push_section(&mut out, "Possible conditions", &self.possible_conditions);
        push_section(&mut out, "Recommended next steps", &self.recommended_next_steps);
        out.trim_end().to_string()
    }
}

pub(crate) fn push_section(out: &mut String, title: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

/// One specialist on the panel, backed by an LLM
pub struct SpecialistSkill {
    specialty: Specialty,
    config: ModelConfig,
}

impl SpecialistSkill {
    pub fn new(specialty: Specialty, config: ModelConfig) -> Self {
        Self { specialty, config }
    }

    pub fn specialty(&self) -> Specialty {
        self.specialty
    }

    /// SDK-style call returning the structured opinion
    pub async fn run(
        specialty: Specialty,
        document: &str,
        config: &ModelConfig,
    ) -> anyhow::Result<SpecialistOpinion> {
        let prompt = format!("Medical report:\n\n{}", document);
        run_llm_function!(config, SpecialistOpinion, specialty.system_prompt(), prompt)
    }
}

#[async_trait]
impl SpecialistEvaluator for SpecialistSkill {
    fn identity(&self) -> &str {
        self.specialty.identity()
    }

    async fn evaluate(&self, document: &str) -> anyhow::Result<String> {
        tracing::debug!(
            specialist = self.specialty.identity(),
            provider = self.config.provider.slug(),
            model = %self.config.model,
            "Consulting specialist"
        );
        let opinion = Self::run(self.specialty, document, &self.config).await?;
        Ok(opinion.to_report(self.specialty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialty_identities_are_unique_and_ordered() {
        let ids: Vec<_> = Specialty::all().iter().map(|s| s.identity()).collect();
        assert_eq!(ids, vec!["cardiologist", "psychologist", "pulmonologist"]);
    }

    #[test]
    fn test_specialty_prompts_differ() {
        assert_ne!(
            Specialty::Cardiologist.system_prompt(),
            Specialty::Pulmonologist.system_prompt()
        );
        assert!(Specialty::Psychologist.system_prompt().contains("psychologist"));
    }

    #[test]
    fn test_opinion_renders_sections() {
        let opinion = SpecialistOpinion {
            findings: vec!["BP 180/110".into(), "  ".into()],
            possible_conditions: vec!["Hypertensive urgency".into()],
            recommended_next_steps: Vec::new(),
            assessment: " Elevated blood pressure with chest pain. ".into(),
        };

        let report = opinion.to_report(Specialty::Cardiologist);

        assert!(report.starts_with("Cardiologist assessment\n\nElevated blood pressure"));
        assert!(report.contains("Findings:\n- BP 180/110"));
        assert!(report.contains("Possible conditions:\n- Hypertensive urgency"));
        assert!(!report.contains("Recommended next steps"));
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn test_skill_identity_matches_specialty() {
        let skill = SpecialistSkill::new(Specialty::Pulmonologist, ModelConfig::default());
        assert_eq!(skill.identity(), "pulmonologist");
        assert_eq!(skill.specialty(), Specialty::Pulmonologist);
    }
}
