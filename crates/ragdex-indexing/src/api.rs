//! HTTP surface of the indexing service

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use ragdex_core::{Error, IndexSummary, SearchHit};

use crate::config::ApiConfig;
use crate::service::{
    DEFAULT_FILE_CHUNK_SIZE, DEFAULT_FILE_INDEX, DEFAULT_TEXT_CHUNK_SIZE, DEFAULT_TOP_K,
    IndexingService,
};

#[derive(Debug, Deserialize)]
pub struct CreateIndexRequest {
    pub index_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateIndexResponse {
    pub message: String,
    pub index_description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChunkedDocumentRequest {
    pub index_name: String,
    pub description: String,
    pub content: String,
    #[serde(default = "default_text_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct IndexFileParams {
    #[serde(default = "default_file_index")]
    pub index_name: String,
    #[serde(default = "default_file_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub index_name: String,
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub index_name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct ListIndicesResponse {
    pub indices: Vec<IndexSummary>,
}

#[derive(Debug, Serialize)]
pub struct IndexContentResponse {
    pub index: String,
    pub documents: Vec<SearchHit>,
}

fn default_text_chunk_size() -> usize {
    DEFAULT_TEXT_CHUNK_SIZE
}

fn default_file_chunk_size() -> usize {
    DEFAULT_FILE_CHUNK_SIZE
}

fn default_file_index() -> String {
    DEFAULT_FILE_INDEX.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Service error rendered as `{"detail": "..."}` with a matching status code
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(Error::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let detail = match self.0 {
            Error::NotFound(message)
            | Error::InvalidInput(message)
            | Error::UnsupportedFormat(message) => message,
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// Extractors are taken as `Result` so malformed requests still answer with `detail`
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;
type QueryParams<T> = std::result::Result<Query<T>, QueryRejection>;

/// Build the router with all indexing endpoints
pub fn router(service: IndexingService, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/create_index/", post(create_index))
        .route("/index_document_chunked/", post(index_document_chunked))
        .route("/index_file/", post(index_file))
        .route("/search/", get(search))
        .route("/list_indices/", get(list_indices))
        .route("/index_content/", get(index_content))
        .route("/delete_index/", delete(delete_index))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Serve the indexing API until the process is stopped
pub async fn run_server(config: &ApiConfig, service: IndexingService) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.staging_dir)?;
    let service = service.with_staging_dir(&config.staging_dir);
    let app = router(service, config.max_upload_bytes);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "indexing API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "ragdex",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document indexing and semantic search API"
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn create_index(
    State(service): State<IndexingService>,
    payload: JsonBody<CreateIndexRequest>,
) -> ApiResult<CreateIndexResponse> {
    let Json(req) = payload?;
    let creation = service
        .create_index(&req.index_name, req.description.as_deref())
        .await?;

    let message = if creation.created {
        format!("Index '{}' created successfully.", creation.index)
    } else {
        format!("Index '{}' already exists.", creation.index)
    };

    Ok(Json(CreateIndexResponse {
        message,
        index_description: creation.description,
    }))
}

async fn index_document_chunked(
    State(service): State<IndexingService>,
    payload: JsonBody<ChunkedDocumentRequest>,
) -> ApiResult<MessageResponse> {
    let Json(req) = payload?;
    let report = service
        .index_text(&req.index_name, &req.description, &req.content, req.chunk_size)
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Indexed {} chunks from '{}' into '{}'.",
            report.chunks_indexed, report.source, report.index
        ),
    }))
}

async fn index_file(
    State(service): State<IndexingService>,
    params: QueryParams<IndexFileParams>,
    mut multipart: Multipart,
) -> ApiResult<MessageResponse> {
    let Query(params) = params?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput("uploaded file has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("failed to read upload: {}", e)))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload
        .ok_or_else(|| Error::InvalidInput("missing multipart field 'file'".to_string()))?;

    let report = service
        .index_file(&params.index_name, &filename, &bytes, params.chunk_size)
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Indexed {} chunks from '{}' into '{}'.",
            report.chunks_indexed, report.source, report.index
        ),
    }))
}

async fn search(
    State(service): State<IndexingService>,
    params: QueryParams<SearchParams>,
) -> ApiResult<SearchResponse> {
    let Query(params) = params?;
    let results = service
        .search(&params.index_name, &params.query, params.top_k)
        .await?;
    Ok(Json(SearchResponse { results }))
}

async fn list_indices(State(service): State<IndexingService>) -> ApiResult<ListIndicesResponse> {
    let indices = service.list_indices().await?;
    Ok(Json(ListIndicesResponse { indices }))
}

async fn index_content(
    State(service): State<IndexingService>,
    params: QueryParams<IndexParams>,
) -> ApiResult<IndexContentResponse> {
    let Query(params) = params?;
    let documents = service.index_content(&params.index_name).await?;
    Ok(Json(IndexContentResponse {
        index: params.index_name,
        documents,
    }))
}

async fn delete_index(
    State(service): State<IndexingService>,
    params: QueryParams<IndexParams>,
) -> ApiResult<MessageResponse> {
    let Query(params) = params?;
    service.delete_index(&params.index_name).await?;
    Ok(Json(MessageResponse {
        message: format!("Index '{}' deleted successfully.", params.index_name),
    }))
}
