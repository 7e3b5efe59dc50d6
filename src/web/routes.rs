use crate::api::models::AppState;
use crate::web::handlers::{detail_page, list_page, login_form, login_submit, logout};
use axum::{
    Router,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_page))
        .route("/{id}/", get(detail_page))
        .route("/accounts/login/", get(login_form).post(login_submit))
        .route("/accounts/logout/", post(logout))
}
