//! JSON HTTP API over the storyforge services.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ApiError;
use crate::application::Storyforge;
use crate::domain::models::{
    Chunk, DuplicateMatch, Epic, GeneratedFiles, ServerConfig, Story, TrackerHealth,
};
use crate::domain::ports::{TrackerConfigUpdate, TrackerConfigView};
use crate::infrastructure::ingestion::load_bytes;

/// Largest accepted request body, uploads included.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Filename assumed when an upload carries none.
const DEFAULT_UPLOAD_NAME: &str = "requirements.txt";

type AppState = Arc<Storyforge>;
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub filename: String,
    pub requirements_text: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateEpicsRequest {
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EpicsResponse {
    pub epics: Vec<Epic>,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateEpicRequest {
    pub source: String,
    pub epic_name: String,
    #[serde(default)]
    pub previous_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateStoriesRequest {
    pub epic: Epic,
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoriesResponse {
    pub stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateStoryRequest {
    pub story: Story,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicatesRequest {
    pub story: Story,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DuplicatesResponse {
    pub duplicates: Vec<DuplicateMatch>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateCodeRequest {
    pub story: Story,
    pub stack: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesResponse {
    pub files: GeneratedFiles,
}

#[derive(Debug, Deserialize)]
pub struct CreateStoriesRequest {
    #[serde(default)]
    pub stories: Vec<Story>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Build the router. CORS is permissive when enabled.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/requirements/parse", post(parse_requirements))
        .route("/epics/generate", post(generate_epics))
        .route("/epics/regenerate", post(regenerate_epic))
        .route("/stories/generate", post(generate_stories))
        .route("/stories/regenerate", post(regenerate_story))
        .route("/stories/check-duplicates", post(check_duplicates))
        .route("/stories/generate-code", post(generate_code))
        .route("/jira/create-stories", post(create_stories))
        .route("/jira/config", get(jira_config))
        .route("/jira/configure", post(jira_configure))
        .route("/jira/health", get(jira_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// HTTP server bound to the configured address.
pub struct HttpServer {
    state: AppState,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self { state, config }
    }

    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = build_router(self.state, self.config.enable_cors);

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "storyforge HTTP server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "storyforge",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "POST /requirements/parse, /epics/generate, /stories/generate",
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn parse_requirements(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ParseResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("invalid_upload", e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request("invalid_upload", e.to_string()))?;

        let requirements_text = load_bytes(&filename, &bytes)?;
        let chunks = state.chunker.chunk(&requirements_text);
        info!(%filename, chunks = chunks.len(), "parsed requirements upload");

        return Ok(Json(ParseResponse {
            filename,
            requirements_text,
            chunks,
        }));
    }

    Err(ApiError::bad_request(
        "invalid_upload",
        "multipart field \"file\" is required",
    ))
}

async fn generate_epics(
    State(state): State<AppState>,
    Json(request): Json<GenerateEpicsRequest>,
) -> ApiResult<EpicsResponse> {
    let epics = state
        .epics
        .generate_epics_from_requirements(&request.chunks, request.query.as_deref(), request.top_k)
        .await?;
    Ok(Json(EpicsResponse { epics }))
}

async fn regenerate_epic(
    State(state): State<AppState>,
    Json(request): Json<RegenerateEpicRequest>,
) -> ApiResult<Epic> {
    let epic = state
        .regenerator
        .regenerate_epic(
            &request.source,
            &request.epic_name,
            request.previous_description.as_deref(),
        )
        .await?;
    Ok(Json(epic))
}

async fn generate_stories(
    State(state): State<AppState>,
    Json(request): Json<GenerateStoriesRequest>,
) -> ApiResult<StoriesResponse> {
    let stories = state
        .stories
        .generate_stories_for_epic(&request.epic, &request.chunks, request.top_k)
        .await?;
    Ok(Json(StoriesResponse { stories }))
}

async fn regenerate_story(
    State(state): State<AppState>,
    Json(request): Json<RegenerateStoryRequest>,
) -> ApiResult<Story> {
    let story = state
        .regenerator
        .regenerate_story(&request.story, &request.source)
        .await?;
    Ok(Json(story))
}

async fn check_duplicates(
    State(state): State<AppState>,
    Json(request): Json<CheckDuplicatesRequest>,
) -> ApiResult<DuplicatesResponse> {
    if let Some(threshold) = request.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ApiError::bad_request(
                "invalid_request",
                format!("threshold must be between 0 and 1, got {threshold}"),
            ));
        }
    }

    let duplicates = state
        .duplicates
        .check_story(&request.story, request.threshold)
        .await?;
    Ok(Json(DuplicatesResponse { duplicates }))
}

async fn generate_code(
    State(state): State<AppState>,
    Json(request): Json<GenerateCodeRequest>,
) -> ApiResult<FilesResponse> {
    let files = state
        .code_generator
        .generate_code_for_story(&request.story, &request.stack)
        .await?;
    Ok(Json(FilesResponse { files }))
}

async fn create_stories(
    State(state): State<AppState>,
    Json(request): Json<CreateStoriesRequest>,
) -> ApiResult<KeysResponse> {
    let keys = state.tracker.create_stories(&request.stories).await?;
    Ok(Json(KeysResponse { keys }))
}

async fn jira_config(State(state): State<AppState>) -> Json<TrackerConfigView> {
    Json(state.tracker.config_view().await)
}

async fn jira_configure(
    State(state): State<AppState>,
    Json(update): Json<TrackerConfigUpdate>,
) -> Json<TrackerConfigView> {
    Json(state.tracker.configure(update).await)
}

async fn jira_health(State(state): State<AppState>) -> Json<TrackerHealth> {
    Json(state.tracker.health().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_epics_request_optional_fields() {
        let request: GenerateEpicsRequest =
            serde_json::from_str(r#"{"chunks": [{"chunk_id": "C-1", "text": "x"}]}"#).unwrap();
        assert_eq!(request.chunks.len(), 1);
        assert!(request.query.is_none());
        assert!(request.top_k.is_none());
    }

    #[test]
    fn test_create_stories_defaults_to_empty() {
        let request: CreateStoriesRequest = serde_json::from_str("{}").unwrap();
        assert!(request.stories.is_empty());
    }
}
