//! Memvid API Service: REST wrapper around the local memvid binary.
//!
//! Each request is translated into one invocation of the binary against a
//! `.mv2` memory file in the data directory.
//! Default: http://127.0.0.1:8000/

mod auth;
mod config;
mod error;
mod memory_path;
mod memvid;
mod routes;
mod staging;
#[cfg(test)]
mod test_support;

use config::Config;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    for dir in [&config.data_dir, &config.documents_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Could not create {}: {}", dir.display(), e);
        }
    }

    log::info!("Memvid binary: {}", config.memvid_bin.display());
    log::info!("Data directory: {}", config.data_dir.display());
    log::info!("Documents directory: {}", config.documents_dir.display());
    log::info!(
        "Command timeout: {}s",
        config.command_timeout.as_secs()
    );
    if !config.auth_enabled() {
        log::warn!("MEMVID_API_KEY not set, authentication disabled");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = routes::router(Arc::new(AppState::new(config)));

    log::info!("Memvid API Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
