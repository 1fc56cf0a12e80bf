//! # Swarm Events
//!
//! Progress events emitted while a request moves through the panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of swarm event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwarmEventKind {
    /// Document accepted, fan-out about to begin
    PipelineStarted,
    /// A specialist call was dispatched
    SpecialistStarted,
    /// A specialist produced its report
    SpecialistCompleted,
    /// A specialist attempt failed and will be retried
    SpecialistRetrying,
    /// A specialist failed for good
    SpecialistFailed,
    /// All specialists joined, synthesis dispatched
    SynthesisStarted,
    /// Summary produced
    SynthesisCompleted,
    /// Synthesis failed
    SynthesisFailed,
    /// Result assembled
    PipelineCompleted,
    /// Pipeline failed
    PipelineFailed,
    /// Caller cancelled the request
    PipelineCancelled,
}

/// An event in the swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmEvent {
    /// Unique event ID
    pub id: String,
    /// Request this event belongs to
    pub request_id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: SwarmEventKind,
    /// Specialist (or "coordinator" / "synthesis") that produced this event
    pub agent: String,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl SwarmEvent {
    /// Create a new event
    pub fn new(kind: SwarmEventKind, request_id: &str, agent: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            kind,
            agent: agent.to_string(),
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = SwarmEvent::new(SwarmEventKind::SpecialistStarted, "req-1", "cardiologist")
            .with_data(serde_json::json!({ "attempt": 1 }));

        assert_eq!(event.agent, "cardiologist");
        assert_eq!(event.request_id, "req-1");
        assert_eq!(event.data.unwrap()["attempt"], 1);
    }

    #[test]
    fn test_event_kind_serialization() {
        let json = serde_json::to_string(&SwarmEventKind::SpecialistRetrying).unwrap();
        assert_eq!(json, "\"specialist_retrying\"");
    }
}
