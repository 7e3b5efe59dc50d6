use crate::api::models::*;
use crate::auth::{CurrentUser, session_token};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{info, warn};

/// Exchange credentials for a bearer token
pub async fn token_handler(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let Some(user) = state.users.authenticate(&request.username, &request.password) else {
        warn!(username = %request.username, "Token request with bad credentials");
        return Err(AppError::Unauthenticated);
    };

    let token = state.sessions.create(user.id).await;
    info!(username = %user.username, "API token issued");

    Ok(Json(TokenResponse {
        token,
        username: user.username.clone(),
    }))
}

/// Revoke the caller's bearer token
pub async fn logout_handler(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    info!(username = %user.username, "API token revoked");
    StatusCode::NO_CONTENT
}
