//! # Team Skill
//!
//! The multidisciplinary team: reads every specialist report and produces
//! one reconciled summary.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::prompts::MULTIDISCIPLINARY_TEAM;
use crate::skills::specialist_skill::push_section;
use crate::swarm::{ReportBundle, SynthesisEvaluator};
use async_trait::async_trait;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity used for model overrides of the synthesis step
pub const TEAM_IDENTITY: &str = "multidisciplinary_team";

/// A health issue the team considers likely
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct HealthIssue {
    pub issue: String,
    /// Why, drawn from the specialist reports
    pub reasoning: String,
    /// Specialists whose report supports this issue
    #[serde(default)]
    pub raised_by: Vec<String>,
}

/// Output from the team skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct TeamAssessment {
    /// Most likely first
    pub health_issues: Vec<HealthIssue>,
    #[serde(default)]
    pub points_of_disagreement: Vec<String>,
    pub summary: String,
}

impl TeamAssessment {
    /// Render as the plain-text multidisciplinary summary
    pub fn to_summary(&self) -> String {
        let mut out = format!("{}\n", self.summary.trim());

        if !self.health_issues.is_empty() {
            out.push_str("\nLikely health issues:\n");
            for (i, issue) in self.health_issues.iter().enumerate() {
                out.push_str(&format!("{}. {}", i + 1, issue.issue.trim()));
                if !issue.raised_by.is_empty() {
                    out.push_str(&format!(" ({})", issue.raised_by.join(", ")));
                }
                out.push('\n');
                out.push_str(&format!("   Reason: {}\n", issue.reasoning.trim()));
            }
        }

        push_section(&mut out, "Points of disagreement", &self.points_of_disagreement);
        out.trim_end().to_string()
    }
}

/// LLM-backed synthesis evaluator
pub struct TeamSkill {
    config: ModelConfig,
}

impl TeamSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// SDK-style call returning the structured assessment
    pub async fn run(bundle: &ReportBundle, config: &ModelConfig) -> anyhow::Result<TeamAssessment> {
        let prompt = format!("Specialist reports:\n\n{}", bundle.to_review_text());
        run_llm_function!(config, TeamAssessment, MULTIDISCIPLINARY_TEAM, prompt)
    }
}

#[async_trait]
impl SynthesisEvaluator for TeamSkill {
    async fn synthesize(&self, bundle: &ReportBundle) -> anyhow::Result<String> {
        tracing::debug!(
            reports = bundle.len(),
            provider = self.config.provider.slug(),
            model = %self.config.model,
            "Convening multidisciplinary team"
        );
        let assessment = Self::run(bundle, &self.config).await?;
        Ok(assessment.to_summary())
    }
}
