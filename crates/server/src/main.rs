//! Medi Analyser
//!
//! `medi serve` runs the HTTP server; `medi analyze <file>` runs the panel
//! once on a local report and prints the JSON result.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use medi_core::models::LlmProvider;
use medi_core::skills::{Specialty, TEAM_IDENTITY};
use medi_core::swarm::{medical_pipeline, CoordinatorConfig, SwarmEvent};
use medi_server::api::{self, AppState, SharedState, EMPTY_UPLOAD_MESSAGE};
use medi_server::config::ServerConfig;
use medi_server::extract;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Medi Analyser - multi-specialist medical report analysis")]
struct Args {
    /// Path to the JSON config file
    #[arg(long, default_value = ServerConfig::DEFAULT_PATH)]
    config: PathBuf,

    /// Provider for every agent (anthropic, openai, gemini, openrouter, grok, deepseek)
    #[arg(long, global = true)]
    provider: Option<LlmProvider>,

    /// Model for every agent; defaults to the provider's default
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze a local .txt or .pdf report and print the result
    Analyze {
        path: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,medi_core=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::load(&args.config).await?;
    config.override_model(args.provider, args.model);

    match args.command {
        Some(CliCommand::Analyze { path, pretty }) => analyze_file(&config, &path, pretty).await,
        Some(CliCommand::Serve { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        None => serve(config).await,
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    warn_missing_api_keys(&config.coordinator);

    let pipeline = medical_pipeline(&config.coordinator)?;
    let state: SharedState = Arc::new(AppState::new(pipeline, &config)?);
    let app = api::router(state.clone(), &config);

    // Drop limiter entries for callers whose quota has refilled
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            sweeper.limiter().retain_recent();
            tracing::debug!(callers = sweeper.limiter().tracked_callers(), "Swept rate limiter");
        }
    });

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "Medi Analyser running at http://{} (quota {} per {}s)",
        addr,
        config.rate_limit.requests,
        config.rate_limit.period_secs
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn analyze_file(config: &ServerConfig, path: &Path, pretty: bool) -> Result<()> {
    warn_missing_api_keys(&config.coordinator);

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid file path: {}", path.display()))?;
    let kind = extract::document_kind(filename, &config.allowed_extensions)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let text = tokio::task::spawn_blocking(move || extract::extract_text(kind, &bytes)).await??;
    if text.trim().is_empty() {
        return Err(anyhow!(EMPTY_UPLOAD_MESSAGE));
    }

    let (event_tx, mut event_rx) = mpsc::channel::<SwarmEvent>(32);
    let pipeline = medical_pipeline(&config.coordinator)?.with_event_channel(event_tx);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            tracing::info!(agent = %event.agent, kind = ?event.kind, "Progress");
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = pipeline
        .analyze_with_cancel(&text, cancel)
        .await
        .with_context(|| format!("Analysis of {} failed", path.display()))?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}

fn warn_missing_api_keys(config: &CoordinatorConfig) {
    let mut identities: Vec<&str> = Specialty::all()
        .iter()
        .map(|s| s.identity())
        .collect();
    identities.push(TEAM_IDENTITY);

    for identity in identities {
        let var = config.model_config_for(identity).provider.api_key_var();
        if std::env::var(var).is_err() {
            tracing::warn!(agent = identity, "{} is not set; calls will fail", var);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
