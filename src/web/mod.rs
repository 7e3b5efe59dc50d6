pub mod handlers;
pub mod routes;
pub mod templates;
pub mod views;

pub use routes::routes;
