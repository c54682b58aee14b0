//! Driftwood Home storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused (the CLI uses it for migrations
//! and seeding).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the complete application router: API routes, static serving for
/// uploaded images, and the middleware stack.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.images().root());

    Router::new()
        .merge(routes::router())
        .nest_service("/uploads", uploads)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
