//! zipdist Service - HTTP microservice for ZIP code distance queries.
//!
//! Resolves two postal codes against a GeoNames postal code export and
//! returns the great-circle distance between them.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ZIPDIST_DATA_DIR` | Directory containing `{COUNTRY}.txt` or `{COUNTRY}.zip` | Current directory |
//! | `ZIPDIST_COUNTRY` | Country code of the dataset | US |
//! | `ZIPDIST_DOWNLOAD` | Download the dataset from GeoNames when missing | false |
//! | `ZIPDIST_DOWNLOAD_URL` | Custom archive URL template (`{country}` placeholder) | None |
//! | `ZIPDIST_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /distance?zip1=X&zip2=Y&units=km` - Distance between two postal codes
//! - `POST /distance` - Same, with a JSON body
//! - `GET /health` - Health check
//! - `GET /stats` - Dataset statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zipdist::GeoNamesDatasetBuilder;
use zipdist_service::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zipdist_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("ZIPDIST_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // The library handles: ZIPDIST_DATA_DIR, ZIPDIST_COUNTRY, ZIPDIST_DOWNLOAD,
    // ZIPDIST_DOWNLOAD_URL
    if std::env::var_os("ZIPDIST_DATA_DIR").is_none() {
        tracing::warn!("ZIPDIST_DATA_DIR not set, using current directory");
    }
    let builder = GeoNamesDatasetBuilder::from_env_or(".");

    tracing::info!(
        data_dir = %builder.get_data_dir().display(),
        country = builder.get_country(),
        auto_download = builder.has_auto_download(),
        port = port,
        "Loading postal code dataset"
    );

    // File reads and the optional download are blocking; finish before serving
    let dataset = tokio::task::spawn_blocking(move || builder.build()).await??;

    let stats = dataset.stats();
    tracing::info!(
        country = %stats.country,
        postal_codes = stats.postal_codes,
        without_coordinates = stats.without_coordinates,
        skipped_rows = stats.skipped_rows,
        duplicate_rows = stats.duplicate_rows,
        "Dataset loaded"
    );

    let state = Arc::new(AppState::new(dataset));
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
