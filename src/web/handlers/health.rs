//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::web::state::SharedState;

pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let st = state.lock().await;
    match st.storage.ping() {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "status": "healthy",
                "database": true,
            })),
        ),
        Err(e) => {
            crate::plog!("health check: database unreachable: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "status": "unhealthy",
                    "database": false,
                })),
            )
        }
    }
}
