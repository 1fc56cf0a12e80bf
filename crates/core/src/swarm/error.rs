//! # Pipeline Errors
//!
//! Failure taxonomy for the analysis pipeline.
//!
//! ```text
//! PipelineError
//!   ├── InvalidInput          (client fault, nothing was invoked)
//!   ├── Evaluator(CoordinatorError)
//!   │     └── Vec<EvaluatorFailure { identity, cause }>
//!   ├── Synthesis(SynthesisFailure { cause })
//!   └── Cancelled
//! ```

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a single specialist evaluator failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluatorCause {
    /// The call did not finish inside the configured per-call timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The evaluator (or its backend) returned an error
    #[error("upstream error: {0}")]
    Upstream(String),
    /// The evaluator returned a blank report
    #[error("returned an empty report")]
    EmptyReport,
    /// The evaluator task panicked or was aborted
    #[error("task aborted: {0}")]
    Panicked(String),
}

impl EvaluatorCause {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, EvaluatorCause::Timeout(_) | EvaluatorCause::Upstream(_))
    }
}

/// One specialist failed. Always carries the evaluator identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("specialist '{identity}' {cause}")]
pub struct EvaluatorFailure {
    pub identity: String,
    pub cause: EvaluatorCause,
}

impl EvaluatorFailure {
    pub fn new(identity: impl Into<String>, cause: EvaluatorCause) -> Self {
        Self {
            identity: identity.into(),
            cause,
        }
    }
}

/// The coordinator could not assemble a complete bundle.
///
/// Lists every failing evaluator in configured order, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorError {
    pub failures: Vec<EvaluatorFailure>,
}

impl CoordinatorError {
    /// Identities of the failing evaluators, in configured order
    pub fn identities(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.identity.as_str()).collect()
    }

    /// The failure for a given identity, if that evaluator failed
    pub fn failure_for(&self, identity: &str) -> Option<&EvaluatorFailure> {
        self.failures.iter().find(|f| f.identity == identity)
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [] => write!(f, "specialist panel failed"),
            [only] => write!(f, "{}", only),
            many => {
                write!(f, "{} specialists failed: ", many.len())?;
                for (i, failure) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}

/// Why the synthesis step failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisCause {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("returned an empty summary")]
    EmptySummary,
}

/// Reconciliation failed despite a complete bundle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("multidisciplinary synthesis {cause}")]
pub struct SynthesisFailure {
    pub cause: SynthesisCause,
}

impl SynthesisFailure {
    pub fn new(cause: SynthesisCause) -> Self {
        Self { cause }
    }
}

/// Coarse category used by the boundary layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller sent something unusable
    Client,
    /// A specialist or the synthesis step failed
    Upstream,
    /// The caller went away
    Cancelled,
}

/// Umbrella error returned by `AnalysisPipeline::analyze`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Evaluator(#[from] CoordinatorError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisFailure),

    #[error("analysis cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::InvalidInput(_) => ErrorCategory::Client,
            PipelineError::Evaluator(_) | PipelineError::Synthesis(_) => ErrorCategory::Upstream,
            PipelineError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Stable machine-readable kind for transport bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::Evaluator(_) => "specialist_failure",
            PipelineError::Synthesis(_) => "synthesis_failure",
            PipelineError::Cancelled => "cancelled",
        }
    }
}

/// The specialist panel handed to a pipeline is unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelConfigError {
    #[error("at least one specialist evaluator is required")]
    EmptyPanel,
    #[error("specialist identity '{0}' is configured more than once")]
    DuplicateSpecialist(String),
    #[error("specialist identity must not be blank")]
    BlankIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_error_lists_every_failure() {
        let err = CoordinatorError {
            failures: vec![
                EvaluatorFailure::new("cardiologist", EvaluatorCause::Upstream("502".into())),
                EvaluatorFailure::new(
                    "psychologist",
                    EvaluatorCause::Timeout(Duration::from_secs(5)),
                ),
            ],
        };

        assert_eq!(err.identities(), vec!["cardiologist", "psychologist"]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 specialists failed"));
        assert!(msg.contains("cardiologist"));
        assert!(msg.contains("psychologist"));
        assert!(matches!(
            err.failure_for("psychologist").unwrap().cause,
            EvaluatorCause::Timeout(_)
        ));
        assert!(err.failure_for("pulmonologist").is_none());
    }

    #[test]
    fn test_categories_stay_distinct() {
        let invalid = PipelineError::InvalidInput("empty".into());
        let evaluator = PipelineError::from(CoordinatorError {
            failures: vec![EvaluatorFailure::new("a", EvaluatorCause::EmptyReport)],
        });
        let synthesis = PipelineError::from(SynthesisFailure::new(SynthesisCause::EmptySummary));

        assert_eq!(invalid.category(), ErrorCategory::Client);
        assert_eq!(evaluator.category(), ErrorCategory::Upstream);
        assert_eq!(synthesis.category(), ErrorCategory::Upstream);
        assert_ne!(evaluator.kind(), synthesis.kind());
        assert_eq!(PipelineError::Cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn test_retryable_causes() {
        assert!(EvaluatorCause::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(EvaluatorCause::Upstream("x".into()).is_retryable());
        assert!(!EvaluatorCause::EmptyReport.is_retryable());
        assert!(!EvaluatorCause::Panicked("x".into()).is_retryable());
    }
}
