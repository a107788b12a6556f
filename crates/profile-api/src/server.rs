//! HTTP server for the profile API

use std::net::SocketAddr;

use axum::http::Method;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::edge::edge_cache;
use crate::routes;
use crate::state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any)
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Profiles; `{id}` is the handle, or the platform when a handle follows
        .route(
            "/profile/batch/{ids}",
            get(routes::profile::get_profile_batch),
        )
        .route(
            "/profile/{id}/{handle}",
            get(routes::profile::get_platform_profile),
        )
        .route("/profile/{id}", get(routes::profile::get_profile))
        // Name service
        .route("/ns/batch/{ids}", get(routes::profile::get_ns_batch))
        .route(
            "/ns/{id}/{handle}",
            get(routes::profile::get_platform_ns),
        )
        .route("/ns/{id}", get(routes::profile::get_ns))
        // Derived views
        .route(
            "/credentials/{handle}",
            get(routes::views::get_credentials),
        )
        .route("/wallet/{handle}", get(routes::views::get_wallet))
        .route("/domain/{handle}", get(routes::views::get_domain))
        .route("/avatar/{handle}", get(routes::views::get_avatar))
        .route("/search/{handle}", get(routes::views::get_search))
        .route("/refresh/{handle}", get(routes::views::get_refresh))
        .layer(middleware::from_fn_with_state(state.clone(), edge_cache))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(
    state: AppState,
    port: u16,
    cors_origins: &[String],
) -> std::io::Result<()> {
    let router = create_router(state, cors_origins);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
