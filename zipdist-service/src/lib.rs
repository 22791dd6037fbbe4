//! zipdist Service Library
//!
//! HTTP handlers, router and types for the ZIP code distance service.
//! This library is used by both the zipdist-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use zipdist::{DatasetStats, GeoNamesDataset, Resolver};

/// Application state shared across handlers.
pub struct AppState {
    /// Resolver over the loaded postal code dataset.
    pub resolver: Resolver,
    /// Statistics captured when the dataset was loaded.
    pub dataset_stats: DatasetStats,
}

impl AppState {
    /// Wrap a loaded dataset. The dataset is never reloaded afterwards.
    pub fn new(dataset: GeoNamesDataset) -> Self {
        let dataset_stats = dataset.stats().clone();
        Self {
            resolver: Resolver::new(Arc::new(dataset)),
            dataset_stats,
        }
    }
}

/// OpenAPI documentation for the zipdist service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "zipdist Distance Service",
        version = "0.1.0",
        description = "Great-circle distance between postal codes.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Pedro Sanz Martinez", url = "https://github.com/pedrosanzmtz/zipdist")
    ),
    paths(
        handlers::get_distance,
        handlers::post_distance,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::DistanceQuery,
            handlers::DistanceResponse,
            handlers::CoordsPair,
            handlers::LatLon,
            handlers::PreferredDistance,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "distance", description = "Postal code distance endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the service router with docs, tracing and CORS layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/distance",
            get(handlers::get_distance).post(handlers::post_distance),
        )
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    DistanceQuery, DistanceResponse, ErrorResponse, HealthResponse, StatsResponse,
};
