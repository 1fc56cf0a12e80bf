//! # Server Configuration
//!
//! Loaded once at startup from `.medi/config.json` (if present) and passed
//! explicitly into the router. CLI flags override the file.

use anyhow::{Context, Result};
use medi_core::models::LlmProvider;
use medi_core::swarm::CoordinatorConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Per-caller quota
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per caller per period
    pub requests: u32,
    /// Window length in seconds
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 5,
            period_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Accepted upload extensions, lowercase with leading dot
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    pub rate_limit: RateLimitConfig,
    /// "*" allows any origin
    pub cors_allow_origins: Vec<String>,
    pub coordinator: CoordinatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_extensions: vec![".txt".to_string(), ".pdf".to_string()],
            max_upload_bytes: 10 * 1024 * 1024,
            rate_limit: RateLimitConfig::default(),
            cors_allow_origins: vec!["*".to_string()],
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub const DEFAULT_PATH: &'static str = ".medi/config.json";

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    /// Lowercase extensions and make sure each has a leading dot
    pub fn normalize(&mut self) {
        for ext in &mut self.allowed_extensions {
            let lower = ext.trim().to_ascii_lowercase();
            *ext = if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            };
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid host address '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow_origins.iter().any(|o| o == "*")
    }

    /// Replace the panel-wide provider and model. Per-agent overrides still win.
    pub fn override_model(&mut self, provider: Option<LlmProvider>, model: Option<String>) {
        if let Some(provider) = provider {
            self.coordinator.global_provider = provider;
        }
        if model.is_some() {
            self.coordinator.global_model = model;
        }
    }
}
