//! pitchdesk web server.
//!
//! Serves the REST API for proposals, line items, and dashboard
//! statistics, and persists state in SQLite.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod utils;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;

use crate::storage::Storage;

use config::{Cli, Config};
use state::AppState;

/// Entry point: parse CLI, open storage, start server.
pub async fn run() {
    let cli = Cli::parse();
    let config = Config::from_cli_and_env(cli);

    crate::logging::init();

    crate::plog!("pitchdesk starting");
    crate::plog!("  data directory: {}", config.data_dir.display());

    std::fs::create_dir_all(&config.data_dir).expect("failed to create data directory");
    let db_path = config.db_path();
    let storage = Storage::open(&db_path).expect("failed to open database");
    crate::plog!("  database: {}", db_path.display());

    let state = Arc::new(Mutex::new(AppState { storage }));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    crate::plog!("pitchdesk listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.expect("server error");
}
