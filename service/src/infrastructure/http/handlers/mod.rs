use axum::http::StatusCode;

pub mod admin;
pub mod auth;
pub mod catalog;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
