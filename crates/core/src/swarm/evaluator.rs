//! # Evaluator Capabilities
//!
//! The two seams the pipeline is written against. Concrete backends
//! (LLM skills, test doubles) plug in here without touching the coordinator.

use async_trait::async_trait;
use std::sync::Arc;

use super::bundle::ReportBundle;

/// One independent domain perspective over a document.
///
/// Implementations must not share mutable state with sibling evaluators or
/// depend on the order in which siblings run.
#[async_trait]
pub trait SpecialistEvaluator: Send + Sync {
    /// Stable identity, used as the report key (e.g. "cardiologist")
    fn identity(&self) -> &str;

    /// Produce this specialist's report for the document
    async fn evaluate(&self, document: &str) -> anyhow::Result<String>;
}

/// Reconciles a complete bundle of specialist reports into one summary.
#[async_trait]
pub trait SynthesisEvaluator: Send + Sync {
    async fn synthesize(&self, bundle: &ReportBundle) -> anyhow::Result<String>;
}

/// Shared handle to a specialist, cloned into each fan-out task
pub type SharedSpecialist = Arc<dyn SpecialistEvaluator>;

/// Shared handle to the synthesis step
pub type SharedSynthesis = Arc<dyn SynthesisEvaluator>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_specialist(_: &dyn SpecialistEvaluator) {}
        fn _assert_synthesis(_: &dyn SynthesisEvaluator) {}
    }
}
