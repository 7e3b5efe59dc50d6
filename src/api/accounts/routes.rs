use crate::api::accounts::handlers::{logout_handler, token_handler};
use crate::api::models::AppState;
use axum::{Router, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/token", post(token_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
}
