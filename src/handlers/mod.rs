pub mod agent;
pub mod health;
pub mod user;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::models::error::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("ROUTE_NOT_FOUND", "Route not found")),
    )
}
