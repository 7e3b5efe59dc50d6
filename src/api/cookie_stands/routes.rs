use crate::api::cookie_stands::handlers::{
    create_handler, delete_handler, detail_handler, list_handler, update_handler,
};
use crate::api::models::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/cookie_stands/",
            get(list_handler).post(create_handler),
        )
        .route(
            "/api/v1/cookie_stands/{id}/",
            get(detail_handler).put(update_handler).delete(delete_handler),
        )
}
