use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::cors::CorsLayer;

use crate::models::error::ErrorResponse;

/// Fixed origin allow-list applied to every request.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<Vec<String>>,
}

impl OriginPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed: Arc::new(allowed_origins),
        }
    }

    /// Requests without a declared origin pass; anything else must be on
    /// the allow-list.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed.iter().any(|allowed| allowed == origin),
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.allowed
    }
}

/// Rejects requests from non-allow-listed origins before they reach a
/// handler.
pub async fn origin_guard(
    State(policy): State<OriginPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok());

    if policy.permits(origin) {
        next.run(request).await
    } else {
        tracing::warn!("Rejected request from origin: {:?}", origin);
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("CORS_FORBIDDEN", "Origin not allowed")),
        )
            .into_response()
    }
}

/// Response-header side of the cross-origin policy for the allow-listed
/// origins.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, ACCEPT, ORIGIN])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
