//! Shared types for the memvid API service and its HTTP clients.

use serde::{Deserialize, Serialize};

/// Header carrying the shared secret on protected endpoints.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extension of memory files inside the data directory.
pub const MEMORY_FILE_EXTENSION: &str = "mv2";

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_TIMELINE_LIMIT: usize = 20;

// =====================================================
// Domain Types
// =====================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub name: String,
    pub path: String,
}

// =====================================================
// Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMemoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestTextRequest {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Query string of `POST /memories/{name}/ingest-file`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IngestFileQuery {
    pub title: Option<String>,
}

/// Query string of `GET /memories/{name}/timeline`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineQuery {
    #[serde(default = "default_timeline_limit")]
    pub limit: usize,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TIMELINE_LIMIT,
        }
    }
}

/// Query string of `POST /memories/{name}/verify`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub deep: bool,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_timeline_limit() -> usize {
    DEFAULT_TIMELINE_LIMIT
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub binary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMemoryResponse {
    pub name: String,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMemoriesResponse {
    pub memories: Vec<MemoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMemoryResponse {
    pub status: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub sequence: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestFileResponse {
    pub status: String,
    pub sequence: Option<u64>,
    pub title: Option<String>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub memory_count: usize,
    pub auth_enabled: bool,
    pub timeout_secs: u64,
}
