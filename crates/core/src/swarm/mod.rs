//! # Swarm Orchestration
//!
//! Fans a document out to the specialist panel and reconciles the reports.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Document → [Cardiologist, Psychologist, Pulmonologist] → join → Multidisciplinary Team
//! ```

pub mod bundle;
pub mod coordinator;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod init;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use bundle::{report_field, AnalysisResult, ReportBundle, SUMMARY_FIELD};
pub use coordinator::{CoordinatorConfig, PipelineCoordinator};
pub use error::{
    CoordinatorError, ErrorCategory, EvaluatorCause, EvaluatorFailure, PanelConfigError,
    PipelineError, SynthesisCause, SynthesisFailure,
};
pub use evaluator::{SharedSpecialist, SharedSynthesis, SpecialistEvaluator, SynthesisEvaluator};
pub use events::{SwarmEvent, SwarmEventKind};
pub use init::{medical_pipeline, medical_specialists, medical_team};
pub use pipeline::{AnalysisPipeline, PipelineStage};
