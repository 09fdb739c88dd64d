//! Dashboard aggregation endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::logging;
use crate::web::auth::require_user;
use crate::web::state::SharedState;
use crate::web::utils::api_error;

/// Aggregated statistics over the caller's proposals: total count, counts
/// by status, and sum/average of accepted proposal amounts.
pub async fn dashboard_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match st.storage.dashboard_summary(&user_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(e) => {
            crate::plog!(
                "dashboard aggregation failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch the dashboard",
            )
        }
    }
}
