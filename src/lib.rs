//! Single-profile editing backend: read, replace (multipart) and patch (JSON)
//! one in-memory profile record, with a shared validation schema.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod client;
pub mod config;
pub mod errors;
pub mod model;
pub mod routes;
pub mod store;
pub mod validation;

use config::Settings;
use routes::profile::profile_router;
use store::{seed_profile, ProfileStore};

/// Store seeded with the fixed initial profile and the configured upload reference.
pub fn seeded_store(settings: &Settings) -> ProfileStore {
    ProfileStore::new(seed_profile(), settings.upload_url.as_str())
}

/// Full application router.
pub fn app(store: ProfileStore, settings: Arc<Settings>) -> Router {
    let router = Router::new()
        .nest("/api/profile", profile_router())
        .route("/api/health", get(|| async { "ok" }));

    // Serve the front end for everything that is not an API route
    let router = match &settings.static_dir {
        Some(dir) => {
            let serve_dir =
                ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            router.fallback_service(serve_dir)
        }
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(settings.body_limit_bytes))
        .layer(Extension(store))
        .layer(Extension(settings))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
