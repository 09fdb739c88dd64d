//! Proposal CRUD handlers.
//!
//! Every handler resolves its principal first and passes the resolved user
//! id down into the storage predicate; a proposal owned by someone else is
//! reported as not found, never as forbidden.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::logging;
use crate::storage::{NewProposal, ProposalPatch, ProposalStatus};
use crate::web::auth::require_user;
use crate::web::state::SharedState;
use crate::web::utils::{api_error, now_secs, parse_line_items, proposal_to_json};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    client_info: serde_json::Value,
    engagement_type: String,
    duration: String,
    // Kept as a raw value so a non-array shape gets a 400 with a clear
    // message instead of a generic body-deserialization rejection.
    line_items: serde_json::Value,
}

pub async fn create_proposal_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<CreateProposalRequest>,
) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    let line_items = match parse_line_items(&req.line_items) {
        Ok(items) => items,
        Err(msg) => return api_error(StatusCode::BAD_REQUEST, msg),
    };

    let input = NewProposal {
        client_info: req.client_info,
        engagement_type: req.engagement_type,
        duration: req.duration,
        line_items,
    };
    match st.storage.create_proposal(&user_id, &input, now_secs()) {
        Ok((row, items)) => {
            crate::plog!(
                "proposal {} created by {}",
                logging::record_id(&row.id),
                logging::user_id(&user_id)
            );
            (
                StatusCode::CREATED,
                axum::Json(serde_json::json!({
                    "message": "Proposal created",
                    "proposal": proposal_to_json(&row, &items),
                })),
            )
                .into_response()
        }
        Err(e) => {
            crate::plog!(
                "proposal create failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create proposal")
        }
    }
}

pub async fn list_proposals_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match st.storage.list_proposals(&user_id) {
        Ok(proposals) => {
            let json: Vec<serde_json::Value> = proposals
                .iter()
                .map(|(row, items)| proposal_to_json(row, items))
                .collect();
            (
                StatusCode::OK,
                axum::Json(serde_json::json!({
                    "message": "Proposals fetched",
                    "proposals": json,
                })),
            )
                .into_response()
        }
        Err(e) => {
            crate::plog!(
                "proposal list failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch proposals")
        }
    }
}

pub async fn get_proposal_handler(
    State(state): State<SharedState>,
    Path(proposal_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match st.storage.get_proposal(&user_id, &proposal_id) {
        Ok(Some((row, items))) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "message": "Proposal fetched",
                "proposal": proposal_to_json(&row, &items),
            })),
        )
            .into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Proposal not found"),
        Err(e) => {
            crate::plog!(
                "proposal fetch failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch proposal")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposalRequest {
    #[serde(default)]
    client_info: Option<serde_json::Value>,
    #[serde(default)]
    engagement_type: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    status: Option<ProposalStatus>,
    #[serde(default)]
    line_items: Option<serde_json::Value>,
}

pub async fn update_proposal_handler(
    State(state): State<SharedState>,
    Path(proposal_id): Path<String>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<UpdateProposalRequest>,
) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    let line_items = match &req.line_items {
        Some(value) => match parse_line_items(value) {
            Ok(items) => Some(items),
            Err(msg) => return api_error(StatusCode::BAD_REQUEST, msg),
        },
        None => None,
    };

    let patch = ProposalPatch {
        client_info: req.client_info,
        engagement_type: req.engagement_type,
        duration: req.duration,
        status: req.status,
        line_items,
    };
    match st
        .storage
        .update_proposal(&user_id, &proposal_id, &patch, now_secs())
    {
        Ok(Some((row, items))) => {
            crate::plog!(
                "proposal {} updated by {}",
                logging::record_id(&row.id),
                logging::user_id(&user_id)
            );
            (
                StatusCode::OK,
                axum::Json(serde_json::json!({
                    "message": "Proposal updated",
                    "proposal": proposal_to_json(&row, &items),
                })),
            )
                .into_response()
        }
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Proposal not found"),
        Err(e) => {
            crate::plog!(
                "proposal update failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update the proposal",
            )
        }
    }
}

pub async fn delete_proposal_handler(
    State(state): State<SharedState>,
    Path(proposal_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user_id = match require_user(&headers, &st.storage) {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match st.storage.delete_proposal(&user_id, &proposal_id) {
        Ok(true) => {
            crate::plog!(
                "proposal {} deleted by {}",
                logging::record_id(&proposal_id),
                logging::user_id(&user_id)
            );
            (
                StatusCode::OK,
                axum::Json(serde_json::json!({ "message": "Proposal deleted" })),
            )
                .into_response()
        }
        Ok(false) => api_error(StatusCode::NOT_FOUND, "Proposal not found"),
        Err(e) => {
            crate::plog!(
                "proposal delete failed for {}: {e}",
                logging::user_id(&user_id)
            );
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete the proposal",
            )
        }
    }
}
