//! Shared fixtures: deterministic evaluators and a router wired to them.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request};
use axum::Router;
use medi_core::swarm::{
    AnalysisPipeline, CoordinatorConfig, ReportBundle, SharedSpecialist, SharedSynthesis,
    SpecialistEvaluator, SynthesisEvaluator,
};
use medi_server::api::{self, AppState};
use medi_server::config::{RateLimitConfig, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;

pub const BOUNDARY: &str = "medi-test-boundary";

pub struct Fixed {
    identity: String,
    report: String,
}

#[async_trait]
impl SpecialistEvaluator for Fixed {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        Ok(self.report.clone())
    }
}

pub struct Failing {
    identity: String,
}

#[async_trait]
impl SpecialistEvaluator for Failing {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("model unavailable"))
    }
}

/// Joins reports with a space
pub struct Concat;

#[async_trait]
impl SynthesisEvaluator for Concat {
    async fn synthesize(&self, bundle: &ReportBundle) -> anyhow::Result<String> {
        Ok(bundle.iter().map(|(_, report)| report).collect::<Vec<_>>().join(" "))
    }
}

/// A team that never answers
pub struct BrokenSynthesis;

#[async_trait]
impl SynthesisEvaluator for BrokenSynthesis {
    async fn synthesize(&self, _bundle: &ReportBundle) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("team unavailable"))
    }
}

pub fn fixed(identity: &str, report: &str) -> SharedSpecialist {
    Arc::new(Fixed {
        identity: identity.to_string(),
        report: report.to_string(),
    })
}

pub fn failing(identity: &str) -> SharedSpecialist {
    Arc::new(Failing {
        identity: identity.to_string(),
    })
}

pub fn healthy_panel() -> Vec<SharedSpecialist> {
    vec![
        fixed("cardiologist", "C1"),
        fixed("psychologist", "P1"),
        fixed("pulmonologist", "Pu1"),
    ]
}

pub fn test_config(requests: u32) -> ServerConfig {
    ServerConfig {
        rate_limit: RateLimitConfig {
            requests,
            period_secs: 86_400,
        },
        coordinator: CoordinatorConfig {
            max_retries: 0,
            ..CoordinatorConfig::default()
        },
        ..ServerConfig::default()
    }
}

pub fn app_with(specialists: Vec<SharedSpecialist>, config: &ServerConfig) -> Router {
    app_with_synthesis(specialists, Arc::new(Concat), config)
}

pub fn app_with_synthesis(
    specialists: Vec<SharedSpecialist>,
    synthesis: SharedSynthesis,
    config: &ServerConfig,
) -> Router {
    let pipeline = AnalysisPipeline::new(specialists, synthesis, &config.coordinator)
        .expect("valid panel");
    let state = Arc::new(AppState::new(pipeline, config).expect("valid state"));
    api::router(state, config).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
}

pub fn upload(filename: &str, content: &[u8]) -> Request<Body> {
    multipart_request("file", Some(filename), content)
}

pub fn multipart_request(field: &str, filename: Option<&str>, content: &[u8]) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };
    let mut body = format!(
        "--{b}\r\nContent-Disposition: {d}\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = BOUNDARY,
        d = disposition
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request")
}
