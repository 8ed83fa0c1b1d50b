use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the external memvid binary
    pub memvid_bin: PathBuf,
    /// Directory holding `<name>.mv2` memory files
    pub data_dir: PathBuf,
    /// Staging directory for uploaded documents
    pub documents_dir: PathBuf,
    /// Shared secret expected in `X-API-Key`; empty disables authentication
    pub api_key: String,
    pub host: String,
    pub port: u16,
    pub command_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            memvid_bin: env::var("MEMVID_BIN")
                .unwrap_or_else(|_| "/app/memvid".to_string())
                .into(),
            data_dir: env::var("MEMVID_DATA_DIR")
                .unwrap_or_else(|_| "/data".to_string())
                .into(),
            documents_dir: env::var("MEMVID_DOCUMENTS_DIR")
                .unwrap_or_else(|_| "/documents".to_string())
                .into(),
            api_key: env::var("MEMVID_API_KEY").unwrap_or_default(),
            host: env::var("MEMVID_API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("MEMVID_API_PORT").unwrap_or(8000),
            command_timeout: Duration::from_secs(
                parse_var("MEMVID_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_upload_bytes: parse_var("MEMVID_MAX_UPLOAD_BYTES")
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn auth_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
