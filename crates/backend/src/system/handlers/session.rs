use axum::{extract::State, http::StatusCode, Json};
use contracts::system::auth::SessionUser;

use crate::routes::AppState;
use crate::system::auth::extractor::CurrentUser;

/// POST /api/system/session
///
/// Publishes a sign-in for the user forwarded by the identity provider.
pub async fn sign_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<SessionUser> {
    state.sessions.publish(Some(user.clone()));
    Json(user)
}

/// DELETE /api/system/session
pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    state.sessions.publish(None);
    StatusCode::NO_CONTENT
}

/// GET /api/system/session
pub async fn current(State(state): State<AppState>) -> Result<Json<SessionUser>, StatusCode> {
    state.sessions.current().map(Json).ok_or(StatusCode::NOT_FOUND)
}
