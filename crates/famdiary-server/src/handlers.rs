//! Handlers for the cookie-session endpoints.
//!
//! Failed verification is reported with one generic message whatever the
//! cause; the reason only goes to the log.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use famdiary_core::auth::cookie::read_credential;
use famdiary_core::models::{MeResponse, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Why `GET /api/auth/me` refused the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    NotAuthenticated,
    InvalidToken,
}

impl SessionRejection {
    pub fn message(&self) -> &'static str {
        match self {
            SessionRejection::NotAuthenticated => "Not authenticated",
            SessionRejection::InvalidToken => "Invalid or expired token",
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, SessionRejection> {
    let cookies = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok());

    let Some(token) = read_credential(cookies) else {
        debug!("No credential cookie on request");
        return Err(SessionRejection::NotAuthenticated);
    };

    match state.verifier.verify(&token) {
        Ok(identity) => {
            debug!(user_id = %identity.subject_id, "Session lookup succeeded");
            Ok(Json(MeResponse {
                authenticated: true,
                user: UserProfile::from(&identity),
            }))
        }
        Err(e) => {
            info!(reason = %e.reason(), "Rejected credential");
            Err(SessionRejection::InvalidToken)
        }
    }
}

/// `POST /api/auth/logout`
///
/// Always succeeds, with or without a session.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("Clearing credential cookie");
    (
        [(header::SET_COOKIE, state.cookies.clear())],
        Json(LogoutResponse { success: true }),
    )
}
