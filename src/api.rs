//! HTTP host for the dashboard
//!
//! Serves the upload page, runs the pipeline once per uploaded document and
//! renders the result. A JSON variant of the analysis endpoint is exposed
//! for programmatic clients.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::FinsightError;
use crate::pipeline::{AnalysisReport, Pipeline};
use crate::presentation::html::{render_dashboard, render_error_page, render_upload_page};
use crate::presentation::DashboardView;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
}

/// =============================
/// Upload Handling
/// =============================

const UPLOAD_FIELD: &str = "file";

fn is_pdf_upload(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let pdf_type = content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let pdf_name = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    pdf_type || pdf_name
}

/// Pull the uploaded document bytes out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> crate::Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FinsightError::Upload(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if !is_pdf_upload(field.content_type(), field.file_name()) {
            return Err(FinsightError::Upload(format!(
                "Only PDF documents are accepted (got {})",
                field.content_type().unwrap_or("unknown type")
            )));
        }

        let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| FinsightError::Upload(format!("Failed to read upload: {}", e)))?;

        info!(file_name = %file_name, bytes = bytes.len(), "Upload received");
        return Ok(bytes.to_vec());
    }

    Err(FinsightError::Upload("No file uploaded".to_string()))
}

async fn run_upload(state: &ApiState, multipart: Multipart) -> crate::Result<AnalysisReport> {
    let bytes = read_upload(multipart).await?;
    state.pipeline.run(bytes).await
}

fn status_for(err: &FinsightError) -> StatusCode {
    match err {
        FinsightError::Upload(_) => StatusCode::BAD_REQUEST,
        FinsightError::Extraction(_) | FinsightError::PdfParse(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FinsightError::Llm(_)
        | FinsightError::LlmRequest(_)
        | FinsightError::Schema(_)
        | FinsightError::InvalidResponse(_)
        | FinsightError::HttpError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(err: &FinsightError) {
    if err.is_client_error() {
        warn!("Upload rejected: {}", err);
    } else {
        error!(trace = ?err.trace(), "Analysis failed");
    }
}

/// =============================
/// Page Endpoints
/// =============================

async fn index() -> Html<String> {
    Html(render_upload_page())
}

async fn analyze_page(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    match run_upload(&state, multipart).await {
        Ok(report) => {
            let view = DashboardView::from_report(&report);
            (StatusCode::OK, Html(render_dashboard(&view)))
        }
        Err(e) => {
            log_failure(&e);
            (status_for(&e), Html(render_error_page(&e.trace())))
        }
    }
}

/// =============================
/// JSON Endpoints
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn analyze_json(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> (StatusCode, Json<ApiResponse>) {
    match run_upload(&state, multipart).await {
        Ok(report) => {
            let view = DashboardView::from_report(&report);
            (
                StatusCode::OK,
                Json(ApiResponse::success(serde_json::json!({
                    "run_id": report.run_id,
                    "analysis": report.analysis,
                    "dashboard": view,
                }))),
            )
        }
        Err(e) => {
            log_failure(&e);
            (
                status_for(&e),
                Json(ApiResponse::error(e.trace().join("\n"))),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(pipeline: Arc<Pipeline>, max_upload_bytes: usize) -> Router {
    let state = ApiState { pipeline };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/analyze", post(analyze_page))
        .route("/api/analyze", post(analyze_json))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    pipeline: Arc<Pipeline>,
    port: u16,
    max_upload_bytes: usize,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(pipeline, max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Dashboard listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
