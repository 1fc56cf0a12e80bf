//! # Analysis Pipeline
//!
//! The single operation exposed to the boundary layer:
//! document text in, `AnalysisResult` (or a categorized failure) out.
//!
//! ```text
//! Validating → Consulting (fan-out + join) → Synthesizing → Complete
//!      └──────────────┴──────────────────────────┴──────▶ Failed / Cancelled
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::bundle::{AnalysisResult, ReportBundle};
use super::coordinator::{CoordinatorConfig, EventSink, PipelineCoordinator};
use super::error::{PanelConfigError, PipelineError, SynthesisCause, SynthesisFailure};
use super::evaluator::{SharedSpecialist, SharedSynthesis};
use super::events::{SwarmEvent, SwarmEventKind};

/// Stage of a single analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Checking the document is usable
    Validating,
    /// Specialists running
    Consulting,
    /// Multidisciplinary team reconciling the reports
    Synthesizing,
    /// Complete
    Complete,
    /// Failed
    Failed,
    /// Caller went away
    Cancelled,
}

impl PipelineStage {
    /// Next stage on success
    pub fn advance(self) -> Self {
        match self {
            PipelineStage::Validating => PipelineStage::Consulting,
            PipelineStage::Consulting => PipelineStage::Synthesizing,
            PipelineStage::Synthesizing => PipelineStage::Complete,
            terminal => terminal,
        }
    }
}

/// Specialist panel + synthesis, composed into one atomic operation
pub struct AnalysisPipeline {
    specialists: Vec<SharedSpecialist>,
    synthesis: SharedSynthesis,
    coordinator: PipelineCoordinator,
    synthesis_timeout: Duration,
    event_tx: Option<mpsc::Sender<SwarmEvent>>,
}

impl AnalysisPipeline {
    /// Build a pipeline over a statically configured panel.
    ///
    /// Identities must be non-blank and unique.
    pub fn new(
        specialists: Vec<SharedSpecialist>,
        synthesis: SharedSynthesis,
        config: &CoordinatorConfig,
    ) -> Result<Self, PanelConfigError> {
        if specialists.is_empty() {
            return Err(PanelConfigError::EmptyPanel);
        }
        let mut seen = HashSet::new();
        for specialist in &specialists {
            let identity = specialist.identity();
            if identity.trim().is_empty() {
                return Err(PanelConfigError::BlankIdentity);
            }
            if !seen.insert(identity.to_string()) {
                return Err(PanelConfigError::DuplicateSpecialist(identity.to_string()));
            }
        }

        Ok(Self {
            specialists,
            synthesis,
            coordinator: PipelineCoordinator::new(config),
            synthesis_timeout: config.synthesis_timeout(),
            event_tx: None,
        })
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SwarmEvent>) -> Self {
        self.coordinator = self.coordinator.with_event_channel(tx.clone());
        self.event_tx = Some(tx);
        self
    }

    /// Configured specialist identities, in order
    pub fn specialist_identities(&self) -> Vec<&str> {
        self.specialists.iter().map(|s| s.identity()).collect()
    }

    /// Analyze a document. Dropping the future abandons all in-flight calls.
    pub async fn analyze(&self, document: &str) -> Result<AnalysisResult, PipelineError> {
        let request_id = Uuid::new_v4().to_string();
        self.run_request(&request_id, document).await
    }

    /// Analyze a document, giving up as soon as `cancel` fires
    pub async fn analyze_with_cancel(
        &self,
        document: &str,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, PipelineError> {
        let request_id = Uuid::new_v4().to_string();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(request_id = %request_id, "Analysis cancelled by caller");
                EventSink::new(&request_id, self.event_tx.clone()).emit(
                    SwarmEventKind::PipelineCancelled,
                    "coordinator",
                    Some(serde_json::json!({ "stage": PipelineStage::Cancelled })),
                );
                Err(PipelineError::Cancelled)
            }
            result = self.run_request(&request_id, document) => result,
        }
    }

    #[tracing::instrument(skip(self, document), fields(doc_chars = document.len()))]
    async fn run_request(
        &self,
        request_id: &str,
        document: &str,
    ) -> Result<AnalysisResult, PipelineError> {
        let events = EventSink::new(request_id, self.event_tx.clone());
        let mut stage = PipelineStage::Validating;

        if document.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "document is empty or contains no readable text".to_string(),
            ));
        }
        stage = stage.advance();

        events.emit(
            SwarmEventKind::PipelineStarted,
            "coordinator",
            Some(serde_json::json!({ "specialists": self.specialist_identities() })),
        );
        tracing::info!(?stage, "Consulting {} specialists", self.specialists.len());

        let bundle = match self
            .coordinator
            .run(request_id, Arc::from(document), &self.specialists)
            .await
        {
            Ok(bundle) => bundle,
            Err(e) => {
                events.emit(
                    SwarmEventKind::PipelineFailed,
                    "coordinator",
                    Some(serde_json::json!({
                        "stage": PipelineStage::Failed,
                        "failed_at": stage,
                        "failed": e.identities(),
                    })),
                );
                return Err(e.into());
            }
        };
        stage = stage.advance();

        tracing::info!(?stage, "All specialists reported, synthesizing");
        let summary = match self.synthesize(&bundle, &events).await {
            Ok(summary) => summary,
            Err(e) => {
                events.emit(
                    SwarmEventKind::PipelineFailed,
                    "coordinator",
                    Some(serde_json::json!({
                        "stage": PipelineStage::Failed,
                        "failed_at": stage,
                        "error": e.to_string(),
                    })),
                );
                return Err(e.into());
            }
        };
        stage = stage.advance();

        tracing::info!(?stage, "Analysis complete");
        events.emit(
            SwarmEventKind::PipelineCompleted,
            "coordinator",
            Some(serde_json::json!({ "stage": stage })),
        );

        Ok(AnalysisResult::new(bundle, summary))
    }

    async fn synthesize(
        &self,
        bundle: &ReportBundle,
        events: &EventSink,
    ) -> Result<String, SynthesisFailure> {
        events.emit(SwarmEventKind::SynthesisStarted, "synthesis", None);

        let outcome =
            tokio::time::timeout(self.synthesis_timeout, self.synthesis.synthesize(bundle)).await;
        let cause = match outcome {
            Ok(Ok(summary)) if !summary.trim().is_empty() => {
                events.emit(SwarmEventKind::SynthesisCompleted, "synthesis", None);
                return Ok(summary);
            }
            Ok(Ok(_)) => SynthesisCause::EmptySummary,
            Ok(Err(e)) => SynthesisCause::Upstream(format!("{:#}", e)),
            Err(_) => SynthesisCause::Timeout(self.synthesis_timeout),
        };

        tracing::warn!("Synthesis failed: {}", cause);
        events.emit(
            SwarmEventKind::SynthesisFailed,
            "synthesis",
            Some(serde_json::json!({ "error": cause.to_string() })),
        );
        Err(SynthesisFailure::new(cause))
    }
}
