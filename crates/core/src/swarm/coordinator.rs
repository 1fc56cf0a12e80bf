//! # Panel Coordinator
//!
//! Runs every configured specialist against the same document and gathers
//! their reports into a `ReportBundle`.
//!
//! ```text
//!              ┌── cardiologist ──┐
//! document ────┼── psychologist ──┼──▶ join ──▶ ReportBundle | CoordinatorError
//!              └── pulmonologist ─┘
//! ```
//!
//! Each call is bounded by a timeout and retried a bounded number of times.
//! The bundle is surfaced only when every specialist succeeded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};

use crate::models::{LlmProvider, ModelConfig};

use super::bundle::ReportBundle;
use super::error::{CoordinatorError, EvaluatorCause, EvaluatorFailure};
use super::evaluator::{SharedSpecialist, SpecialistEvaluator};
use super::events::{SwarmEvent, SwarmEventKind};

/// Configuration for the coordinator and the LLM-backed evaluators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Global LLM provider (default: Anthropic)
    pub global_provider: LlmProvider,
    /// Global model to use for all specialists
    pub global_model: Option<String>,
    /// Base URL override for LLM API (for OpenAI-compatible endpoints)
    pub base_url: Option<String>,
    /// Per-specialist model overrides (identity -> model name)
    pub per_specialist_models: HashMap<String, String>,
    /// Per-specialist provider overrides (identity -> provider)
    pub per_specialist_providers: HashMap<String, LlmProvider>,
    /// Upper bound on a single specialist call
    pub evaluator_timeout_secs: u64,
    /// Upper bound on the synthesis call
    pub synthesis_timeout_secs: u64,
    /// Extra attempts after a retryable failure (0 disables retries)
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    pub retry_backoff_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            global_provider: LlmProvider::Anthropic,
            global_model: None,
            base_url: None,
            per_specialist_models: HashMap::new(),
            per_specialist_providers: HashMap::new(),
            evaluator_timeout_secs: 120,
            synthesis_timeout_secs: 180,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl CoordinatorConfig {
    /// Get model config for a specific specialist (or "multidisciplinary_team")
    pub fn model_config_for(&self, identity: &str) -> ModelConfig {
        // Provider: per-specialist override -> global
        let provider = self
            .per_specialist_providers
            .get(identity)
            .copied()
            .unwrap_or(self.global_provider);

        // Model: per-specialist override -> global -> provider default
        let model = self
            .per_specialist_models
            .get(identity)
            .or(self.global_model.as_ref())
            .cloned()
            .unwrap_or_else(|| provider.default_model().to_string());

        let base_url = if provider.supports_base_url() {
            self.base_url.clone()
        } else {
            None
        };

        ModelConfig {
            provider,
            model,
            base_url,
        }
    }

    pub fn evaluator_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluator_timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Sends events for one request, if anyone is listening
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    request_id: String,
    tx: Option<mpsc::Sender<SwarmEvent>>,
}

impl EventSink {
    pub(crate) fn new(request_id: &str, tx: Option<mpsc::Sender<SwarmEvent>>) -> Self {
        Self {
            request_id: request_id.to_string(),
            tx,
        }
    }

    /// Best effort: a full or closed channel drops the event rather than
    /// holding up the request.
    pub(crate) fn emit(&self, kind: SwarmEventKind, agent: &str, data: Option<serde_json::Value>) {
        let Some(tx) = &self.tx else {
            return;
        };
        let mut event = SwarmEvent::new(kind, &self.request_id, agent);
        event.data = data;
        if let Err(e) = tx.try_send(event) {
            tracing::debug!(request_id = %self.request_id, agent, "Dropped swarm event: {}", e);
        }
    }
}

/// Timeout and retry policy applied to every specialist call
#[derive(Debug, Clone, Copy)]
struct CallPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl CallPolicy {
    /// Linear backoff before retrying after `attempt` failed attempts
    fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// The panel coordinator
#[derive(Debug, Clone)]
pub struct PipelineCoordinator {
    policy: CallPolicy,
    event_tx: Option<mpsc::Sender<SwarmEvent>>,
}

impl PipelineCoordinator {
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            policy: CallPolicy {
                timeout: config.evaluator_timeout(),
                max_retries: config.max_retries,
                backoff: config.retry_backoff(),
            },
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SwarmEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Run every evaluator against the document and assemble the bundle.
    ///
    /// All evaluators run concurrently and are always joined, so a failure
    /// report names every failing specialist. The bundle follows the order of
    /// `evaluators` regardless of completion order. Dropping the returned
    /// future aborts every in-flight call.
    pub async fn run(
        &self,
        request_id: &str,
        document: Arc<str>,
        evaluators: &[SharedSpecialist],
    ) -> Result<ReportBundle, CoordinatorError> {
        let events = EventSink::new(request_id, self.event_tx.clone());
        let mut join_set = JoinSet::new();
        let mut task_slots: HashMap<task::Id, usize> = HashMap::new();

        // SCATTER: one task per specialist, each with the same document
        for (index, evaluator) in evaluators.iter().enumerate() {
            let evaluator = Arc::clone(evaluator);
            let document = Arc::clone(&document);
            let events = events.clone();
            let policy = self.policy;

            let handle = join_set.spawn(async move {
                consult(evaluator.as_ref(), &document, policy, &events).await
            });
            task_slots.insert(handle.id(), index);
        }

        // GATHER: slot results by configured index
        let mut slots: Vec<Option<Result<String, EvaluatorCause>>> = vec![None; evaluators.len()];
        while let Some(joined) = join_set.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => {
                    tracing::error!("Specialist task did not complete: {}", e);
                    (e.id(), Err(EvaluatorCause::Panicked(panic_message(e))))
                }
            };
            if let Some(&index) = task_slots.get(&id) {
                slots[index] = Some(outcome);
            }
        }

        let mut bundle = ReportBundle::new();
        let mut failures = Vec::new();
        for (evaluator, slot) in evaluators.iter().zip(slots) {
            let identity = evaluator.identity();
            let outcome = slot.unwrap_or_else(|| {
                Err(EvaluatorCause::Panicked(
                    "specialist task ended without reporting".to_string(),
                ))
            });
            match outcome {
                Ok(report) => {
                    if bundle.insert(identity, report).is_err() {
                        failures.push(EvaluatorFailure::new(
                            identity,
                            EvaluatorCause::Upstream("duplicate specialist identity".to_string()),
                        ));
                    }
                }
                Err(cause) => failures.push(EvaluatorFailure::new(identity, cause)),
            }
        }

        if failures.is_empty() {
            Ok(bundle)
        } else {
            tracing::warn!(
                "Discarding bundle: {} of {} specialists failed",
                failures.len(),
                evaluators.len()
            );
            Err(CoordinatorError { failures })
        }
    }
}

fn panic_message(e: task::JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    let payload = e.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "specialist task panicked".to_string()
    }
}

/// Call one specialist with timeout and bounded retries
async fn consult(
    evaluator: &dyn SpecialistEvaluator,
    document: &str,
    policy: CallPolicy,
    events: &EventSink,
) -> Result<String, EvaluatorCause> {
    let identity = evaluator.identity();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        events.emit(
            SwarmEventKind::SpecialistStarted,
            identity,
            Some(serde_json::json!({ "attempt": attempt })),
        );

        let started = Instant::now();
        let cause = match tokio::time::timeout(policy.timeout, evaluator.evaluate(document)).await
        {
            Ok(Ok(report)) if !report.trim().is_empty() => {
                tracing::debug!(
                    specialist = identity,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Specialist report received"
                );
                events.emit(
                    SwarmEventKind::SpecialistCompleted,
                    identity,
                    Some(serde_json::json!({ "chars": report.len() })),
                );
                return Ok(report);
            }
            Ok(Ok(_)) => EvaluatorCause::EmptyReport,
            Ok(Err(e)) => EvaluatorCause::Upstream(format!("{:#}", e)),
            Err(_) => EvaluatorCause::Timeout(policy.timeout),
        };

        if cause.is_retryable() && attempt <= policy.max_retries {
            tracing::warn!(
                specialist = identity,
                attempt,
                "Specialist attempt failed ({}), retrying",
                cause
            );
            events.emit(
                SwarmEventKind::SpecialistRetrying,
                identity,
                Some(serde_json::json!({ "attempt": attempt, "error": cause.to_string() })),
            );
            tokio::time::sleep(policy.backoff_after(attempt)).await;
            continue;
        }

        tracing::warn!(specialist = identity, attempt, "Specialist failed: {}", cause);
        events.emit(
            SwarmEventKind::SpecialistFailed,
            identity,
            Some(serde_json::json!({ "error": cause.to_string() })),
        );
        return Err(cause);
    }
}
