//! Axum route handlers for the memvid REST API.

use crate::auth;
use crate::config::Config;
use crate::error::ApiError;
use crate::memory_path;
use crate::memvid::{Invocation, MemvidCli};
use crate::staging::StagedUpload;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::middleware;
use axum::response::Json;
use axum::routing::{delete, get, post};
use memvid_api_types::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub config: Config,
    pub memvid: MemvidCli,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let memvid = MemvidCli::new(config.memvid_bin.clone(), config.command_timeout);
        Self {
            config,
            memvid,
            start_time: Instant::now(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let protected = Router::new()
        .route("/memories", get(list_memories).post(create_memory))
        .route("/memories/:name", delete(delete_memory))
        .route("/memories/:name/ingest", post(ingest_text))
        .route(
            "/memories/:name/ingest-file",
            post(ingest_file).layer(upload_limit),
        )
        .route("/memories/:name/search", post(search))
        .route("/memories/:name/stats", get(stats))
        .route("/memories/:name/timeline", get(timeline))
        .route("/memories/:name/verify", post(verify))
        .route("/status", get(status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
}

fn str_field(result: &Map<String, Value>, key: &str) -> Option<String> {
    result.get(key).and_then(Value::as_str).map(str::to_string)
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        binary: state.memvid.bin().display().to_string(),
    })
}

// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<ServiceStatus>, ApiError> {
    let memories = memory_path::list(&state.config.data_dir)?;
    Ok(Json(ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        memory_count: memories.len(),
        auth_enabled: state.config.auth_enabled(),
        timeout_secs: state.memvid.timeout().as_secs(),
    }))
}

// POST /memories
pub async fn create_memory(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMemoryRequest>,
) -> Result<Json<CreateMemoryResponse>, ApiError> {
    let path = memory_path::resolve(&state.config.data_dir, &req.name)?;
    if path.exists() {
        return Err(ApiError::AlreadyExists);
    }

    let result = state.memvid.run(Invocation::new("create", &path)).await?;
    log::info!("Created memory '{}'", req.name);
    Ok(Json(CreateMemoryResponse {
        name: req.name,
        status: str_field(&result, "status"),
    }))
}

// GET /memories
pub async fn list_memories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListMemoriesResponse>, ApiError> {
    let memories = memory_path::list(&state.config.data_dir)?;
    Ok(Json(ListMemoriesResponse { memories }))
}

// DELETE /memories/:name
pub async fn delete_memory(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DeleteMemoryResponse>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;
    tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ApiError::NotFound,
        _ => ApiError::Io(e),
    })?;

    log::info!("Deleted memory '{}'", name);
    Ok(Json(DeleteMemoryResponse {
        status: "deleted".to_string(),
        name,
    }))
}

// POST /memories/:name/ingest
pub async fn ingest_text(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<IngestTextRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;

    // Content goes after `--` so text starting with a dash is never read as a flag
    let invocation = Invocation::new("put", &path)
        .option("--title", req.title.as_deref())
        .option("--uri", req.uri.as_deref())
        .arg("--")
        .arg(&req.content);
    let result = state.memvid.run(invocation).await?;

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
        sequence: result.get("sequence").and_then(Value::as_u64),
    }))
}

// POST /memories/:name/ingest-file
pub async fn ingest_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<IngestFileQuery>,
    mut multipart: Multipart,
) -> Result<Json<IngestFileResponse>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::InvalidUpload("missing `file` part".to_string()))?;

    let staged =
        StagedUpload::write(&state.config.documents_dir, file_name.as_deref(), &bytes).await?;
    let invocation = Invocation::new("ingest", &path)
        .arg(staged.path())
        .option("--title", query.title.as_deref());
    let result = state.memvid.run(invocation).await;
    drop(staged);
    let result = result?;

    Ok(Json(IngestFileResponse {
        status: "ok".to_string(),
        sequence: result.get("sequence").and_then(Value::as_u64),
        title: str_field(&result, "title"),
    }))
}

// POST /memories/:name/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;

    let top_k = req.top_k.to_string();
    let invocation = Invocation::new("search", &path)
        .option("--top-k", Some(top_k.as_str()))
        .arg("--")
        .arg(&req.query);
    let result = state.memvid.run(invocation).await?;
    Ok(Json(Value::Object(result)))
}

// GET /memories/:name/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;
    let result = state.memvid.run(Invocation::new("stats", &path)).await?;

    let mut body = Map::new();
    body.insert("name".to_string(), Value::String(name));
    body.extend(result);
    Ok(Json(Value::Object(body)))
}

// GET /memories/:name/timeline
pub async fn timeline(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Value>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;

    let limit = query.limit.to_string();
    let invocation = Invocation::new("timeline", &path).option("--limit", Some(limit.as_str()));
    let result = state.memvid.run(invocation).await?;
    Ok(Json(Value::Object(result)))
}

// POST /memories/:name/verify
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>, ApiError> {
    let path = memory_path::resolve_existing(&state.config.data_dir, &name)?;

    let invocation = Invocation::new("verify", &path).switch("--deep", query.deep);
    let result = state.memvid.run(invocation).await?;
    Ok(Json(Value::Object(result)))
}
