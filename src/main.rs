//! PDF Analyzer - upload a PDF, OCR it with Textract, summarize it with Bedrock.

mod analyzer;
mod bedrock;
mod config;
mod error;
mod ocr;
mod page;
mod schema;
mod summarizer;

use analyzer::Analyzer;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use bedrock::BedrockClient;
use config::AppConfig;
use error::AnalysisError;
use ocr::textract::TextractProvider;
use page::PageState;
use schema::{AnalysisRecord, Document};
use std::sync::{Arc, RwLock};
use summarizer::Summarizer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Outcome of the startup connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum ProbeStatus {
    Pending,
    Ok,
    Failed,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
    probe: Arc<RwLock<ProbeStatus>>,
}

impl AppState {
    fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            probe: Arc::new(RwLock::new(ProbeStatus::Pending)),
        }
    }

    fn probe_status(&self) -> ProbeStatus {
        *self.probe.read().unwrap()
    }

    fn services_down(&self) -> bool {
        self.probe_status() == ProbeStatus::Failed
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdf_analyzer=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        "Loaded config: region={}, model={}, max upload {} bytes",
        config.aws.region, config.model_id, config.max_upload_bytes
    );

    // Initialize AWS clients
    let sdk_config = config::load_sdk_config(&config.aws).await;
    let textract = TextractProvider::new(&sdk_config);
    let bedrock = BedrockClient::new(&sdk_config, config.model_id.clone());
    info!("Textract and Bedrock clients initialized");

    let analyzer = Analyzer::new(Arc::new(textract), Summarizer::new(Arc::new(bedrock)));
    let state = AppState::new(analyzer);

    tokio::spawn(run_probe(state.clone()));

    let app = router(state, config.max_upload_bytes);

    // Run server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index).post(analyze_form))
        .route("/api/analyze", axum::routing::post(analyze_api))
        .route("/health", get(health))
        .route("/health/services", get(service_health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Summarize a fixed test document once and record whether it worked.
async fn run_probe(state: AppState) {
    let status = match state.analyzer.summarizer().probe().await {
        Ok(response) => {
            info!("AWS credentials working, probe response: {} chars", response.len());
            ProbeStatus::Ok
        }
        Err(e) => {
            warn!("AWS credentials test failed: {:#}", e);
            ProbeStatus::Failed
        }
    };
    *state.probe.write().unwrap() = status;
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Report the startup probe result.
async fn service_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "probe": state.probe_status() }))
}

/// Render the empty form.
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&PageState::default(), state.services_down()))
}

/// Form submission: run the page state machine and render the outcome.
async fn analyze_form(State(state): State<AppState>, multipart: Multipart) -> Html<String> {
    let services_down = state.services_down();

    let document = match read_upload(multipart).await {
        Ok(document) => document,
        Err((_, message)) => {
            warn!("Rejected upload: {}", message);
            let view = PageState::Idle {
                error: Some(message),
            };
            return Html(page::render(&view, services_down));
        }
    };

    let view = PageState::default().select_file(document);
    let (view, document) = match view.submit() {
        Ok(submitted) => submitted,
        Err(view) => {
            info!("Upload not submitted: {:?}", view.error_message());
            return Html(page::render(&view, services_down));
        }
    };

    let view = match state.analyzer.analyze(&document).await {
        Ok(result) => view.resolve(result),
        Err(e) => {
            error!("PDF analysis error: {}", e);
            view.reject(&e)
        }
    };

    Html(page::render(&view, services_down))
}

/// JSON API: analyze an upload and return the record, or the combined text
/// rendering when the client asks for `text/plain`.
async fn analyze_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let document = read_upload(multipart)
        .await
        .map_err(|(status, message)| api_error(status, message))?;

    if !document.is_pdf() {
        let err = AnalysisError::InvalidFileType(
            document.content_type.clone().unwrap_or_else(|| "unknown".to_string()),
        );
        warn!("Rejected upload {}: {}", document.name, err);
        return Err(api_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            page::INVALID_FILE_MESSAGE.to_string(),
        ));
    }

    let result = state.analyzer.analyze(&document).await.map_err(|e| {
        error!("PDF analysis error: {}", e);
        let status = if e.is_remote() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        api_error(status, page::ANALYSIS_FAILED_MESSAGE.to_string())
    })?;

    if wants_plain_text(&headers) {
        let body = result.to_combined_text();
        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }

    Ok(Json(AnalysisRecord::new(document.name, result)).into_response())
}

// ============================================================================
// Helper functions
// ============================================================================

/// Read the `file` field of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<Document, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
    })? {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("document").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
            })?;

            if bytes.is_empty() {
                break;
            }

            info!(
                "Received file: {} ({} bytes, type {:?})",
                name,
                bytes.len(),
                content_type
            );
            return Ok(Document::new(name, content_type, bytes.to_vec()));
        }
    }

    Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()))
}

fn api_error(status: StatusCode, message: String) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message })))
}

fn wants_plain_text(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/plain"))
        .unwrap_or(false)
}
