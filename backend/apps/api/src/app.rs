//! HTTP application assembly

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use identity::domain::{EventPublisher, TokenManager, UserRepository};
use identity::{IdentityState, identity_router};
use kernel::response::ApiResponse;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

/// GET /api/health
async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health { status: "ok" })
}

pub fn cors_layer(frontend_origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
}

pub fn build_router<U, P, T>(state: IdentityState<U, P, T>, frontend_origins: &[String]) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/v1", identity_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_origins))
}
