//! Registration and login endpoints.
//!
//! Both endpoints issue a session token on success. Login failures for an
//! unknown email and for a wrong password produce identical responses, so
//! the endpoint cannot be used to probe which emails are registered.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::logging;
use crate::storage::UserRow;
use crate::web::auth::{hash_password, issue_session, verify_password};
use crate::web::state::SharedState;
use crate::web::utils::{api_error, now_secs};

#[derive(Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

pub async fn register_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<RegisterRequest>,
) -> Response {
    let st = state.lock().await;

    match st.storage.get_user_by_email(&req.email) {
        Ok(Some(_)) => return api_error(StatusCode::CONFLICT, "User already exists"),
        Ok(None) => {}
        Err(e) => {
            crate::plog!("user lookup failed: {e}");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            crate::plog!("password hashing failed: {e}");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
        }
    };

    let now = now_secs();
    let user = UserRow {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        password_hash,
        name: req.name,
        created_at: now,
    };
    if let Err(e) = st.storage.insert_user(&user) {
        crate::plog!("user insert failed: {e}");
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed");
    }

    match issue_session(&st.storage, &user.id, now) {
        Ok(token) => {
            crate::plog!("registered user {}", logging::user_id(&user.id));
            (
                StatusCode::CREATED,
                axum::Json(serde_json::json!({
                    "id": user.id,
                    "email": user.email,
                    "token": token,
                })),
            )
                .into_response()
        }
        Err(e) => {
            crate::plog!("session issue failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<LoginRequest>,
) -> Response {
    let st = state.lock().await;

    let user = match st.storage.get_user_by_email(&req.email) {
        Ok(Some(user)) => user,
        Ok(None) => return api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(e) => {
            crate::plog!("user lookup failed: {e}");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };
    if !verify_password(&req.password, &user.password_hash) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    match issue_session(&st.storage, &user.id, now_secs()) {
        Ok(token) => {
            crate::plog!("user {} logged in", logging::user_id(&user.id));
            (StatusCode::OK, axum::Json(serde_json::json!({ "token": token }))).into_response()
        }
        Err(e) => {
            crate::plog!("session issue failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
        }
    }
}
