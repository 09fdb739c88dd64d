//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::Storage;

/// State injected into every handler. The storage handle is opened once at
/// startup and lives until the process exits; handlers hold the lock only
/// for the duration of their store calls.
pub struct AppState {
    pub storage: Storage,
}

pub type SharedState = Arc<Mutex<AppState>>;
