//! Shared utility functions for the web server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::storage::{LineItemInput, LineItemRow, ProposalRow};

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

/// Build the JSON representation of a proposal including its line items.
pub fn proposal_to_json(p: &ProposalRow, items: &[LineItemRow]) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "userId": p.user_id,
        "clientInfo": p.client_info,
        "engagementType": p.engagement_type,
        "duration": p.duration,
        "status": p.status,
        "totalAmount": p.total_amount,
        "createdAt": p.created_at,
        "updatedAt": p.updated_at,
        "lineItems": items,
    })
}

/// Validate and decode the `lineItems` request field.
///
/// The field must be a JSON array of `{description, quantity, rate}`
/// objects with non-negative amounts; anything else is a validation
/// failure with a client-facing message. Runs before any store call so a
/// bad request never opens a transaction.
pub fn parse_line_items(value: &serde_json::Value) -> Result<Vec<LineItemInput>, String> {
    if !value.is_array() {
        return Err("lineItems must be an array".to_string());
    }
    let items: Vec<LineItemInput> = serde_json::from_value(value.clone())
        .map_err(|_| "lineItems entries must have description, quantity, and rate".to_string())?;
    for item in &items {
        if item.quantity.is_sign_negative() || item.rate.is_sign_negative() {
            return Err("quantity and rate must be non-negative".to_string());
        }
    }
    Ok(items)
}

/// Current time as seconds since UNIX epoch.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
