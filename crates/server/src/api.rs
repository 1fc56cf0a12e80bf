//! # HTTP API
//!
//! `GET /` liveness, `POST /analyze` multipart upload, `GET /openapi.json`.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, ConnectInfo, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use medi_core::swarm::{AnalysisPipeline, AnalysisResult, PipelineError};

use crate::config::ServerConfig;
use crate::extract::{self, ExtractError};
use crate::limiter::{CallerLimiter, RateLimited};

pub const EMPTY_UPLOAD_MESSAGE: &str = "The uploaded file is empty or contains no readable text.";

/// Application state
pub struct AppState {
    pipeline: Arc<AnalysisPipeline>,
    limiter: CallerLimiter,
    allowed_extensions: Vec<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(pipeline: AnalysisPipeline, config: &ServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(pipeline),
            limiter: CallerLimiter::new(&config.rate_limit)?,
            allowed_extensions: config.allowed_extensions.clone(),
        })
    }

    pub fn limiter(&self) -> &CallerLimiter {
        &self.limiter
    }
}

// === API Types ===

#[derive(Serialize, ToSchema)]
pub struct StatusMessage {
    message: String,
}

/// Successful analysis. Keys follow the configured panel.
#[allow(dead_code)]
#[derive(ToSchema)]
struct AnalysisResponse {
    cardiologist_report: String,
    psychologist_report: String,
    pulmonologist_report: String,
    multidisciplinary_summary: String,
}

#[allow(dead_code)]
#[derive(ToSchema)]
struct UploadForm {
    /// `.txt` or `.pdf` medical report
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: String,
    /// Failing specialists, for `specialist_failure`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialists: Option<Vec<String>>,
}

// === Errors ===

#[derive(Debug)]
pub enum ApiError {
    Upload(ExtractError),
    Multipart(MultipartError),
    RateLimited(RateLimited),
    Pipeline(PipelineError),
    Internal(String),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        ApiError::Upload(err)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        let body = |detail: String, kind: &str| ErrorBody {
            detail,
            kind: kind.to_string(),
            specialists: None,
        };

        match self {
            ApiError::Upload(err) => {
                let kind = match err {
                    ExtractError::MissingFile => "missing_file",
                    ExtractError::UnsupportedType { .. } => "unsupported_file_type",
                    ExtractError::InvalidUtf8 | ExtractError::Pdf(_) => "unreadable_file",
                };
                (StatusCode::BAD_REQUEST, body(err.to_string(), kind))
            }
            ApiError::Multipart(err) => (err.status(), body(err.body_text(), "invalid_upload")),
            ApiError::RateLimited(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                body("Rate limit exceeded. Try again later.".to_string(), "rate_limited"),
            ),
            ApiError::Pipeline(err) => match err {
                PipelineError::InvalidInput(_) => (
                    StatusCode::BAD_REQUEST,
                    body(EMPTY_UPLOAD_MESSAGE.to_string(), err.kind()),
                ),
                PipelineError::Evaluator(failures) => (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        detail: err.to_string(),
                        kind: err.kind().to_string(),
                        specialists: Some(
                            failures.identities().into_iter().map(String::from).collect(),
                        ),
                    },
                ),
                PipelineError::Synthesis(_) => {
                    (StatusCode::BAD_GATEWAY, body(err.to_string(), err.kind()))
                }
                PipelineError::Cancelled => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    body(err.to_string(), err.kind()),
                ),
            },
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                body(detail.clone(), "internal"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited(limited) = &self {
            let secs = limited.retry_after.as_secs() + u64::from(limited.retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medi Analyser API",
        version = "1.0.0",
        description = "Multi-specialist analysis of medical reports"
    ),
    paths(root, analyze_report),
    components(schemas(StatusMessage, AnalysisResponse, UploadForm, ErrorBody)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "analysis", description = "Medical report analysis")
    )
)]
pub struct ApiDoc;

// === Router ===

pub fn router(state: SharedState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze_report))
        .route("/openapi.json", get(serve_openapi))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

// === API Handlers ===

/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = StatusMessage)
    )
)]
async fn root() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "Medi Analyser server is running".to_string(),
    })
}

/// Analyze an uploaded medical report
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "One report per specialist plus the team summary", body = AnalysisResponse),
        (status = 400, description = "Missing, unsupported, unreadable or empty file", body = ErrorBody),
        (status = 429, description = "Caller quota exhausted", body = ErrorBody),
        (status = 502, description = "A specialist or the team failed", body = ErrorBody),
        (status = 503, description = "Analysis cancelled", body = ErrorBody)
    )
)]
async fn analyze_report(
    State(state): State<SharedState>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    state.limiter.check(caller.ip()).map_err(|limited| {
        tracing::info!(caller = %caller.ip(), "Rate limited");
        ApiError::RateLimited(limited)
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }
    let (filename, bytes) = upload.ok_or(ExtractError::MissingFile)?;

    let kind = extract::document_kind(&filename, &state.allowed_extensions)?;
    tracing::info!(filename = %filename, bytes = bytes.len(), "Received report");

    let text = tokio::task::spawn_blocking(move || extract::extract_text(kind, &bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Text extraction task failed: {}", e)))??;

    let result = state.pipeline.analyze(&text).await.map_err(|err| {
        tracing::warn!(kind = err.kind(), "Analysis failed: {}", err);
        ApiError::from(err)
    })?;
    Ok(Json(result))
}

async fn serve_openapi() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => (
            [(header::CONTENT_TYPE, "application/json")],
            Body::from(spec),
        )
            .into_response(),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}
