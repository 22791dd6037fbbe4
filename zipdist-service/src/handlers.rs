//! HTTP request handlers for the distance service.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use zipdist::{ErrorKind, Measurement, Units, ZipError};

use crate::AppState;

/// Distance request, used both as query parameters (GET) and JSON body (POST).
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DistanceQuery {
    /// First postal code. Whitespace is trimmed and only the first 5 characters are used.
    pub zip1: String,
    /// Second postal code.
    pub zip2: String,
    /// Preferred unit: "miles" (default) or "km", case-insensitive.
    #[serde(default)]
    pub units: Option<String>,
}

/// Coordinate of a resolved postal code.
#[derive(Debug, Serialize, ToSchema)]
pub struct LatLon {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Coordinates of both postal codes.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoordsPair {
    pub zip1: LatLon,
    pub zip2: LatLon,
}

/// Distance in the requested unit.
#[derive(Debug, Serialize, ToSchema)]
pub struct PreferredDistance {
    /// Distance rounded to 4 decimal places.
    pub value: f64,
    /// "km" or "miles".
    pub units: String,
}

/// Successful distance response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DistanceResponse {
    /// First postal code exactly as received.
    pub zip1: String,
    /// Second postal code exactly as received.
    pub zip2: String,
    /// Resolved coordinates.
    pub coords: CoordsPair,
    /// Distance in kilometers, 4 decimal places.
    pub distance_km: f64,
    /// Distance in miles, 4 decimal places.
    pub distance_miles: f64,
    /// Distance in the preferred unit.
    pub distance: PreferredDistance,
}

impl DistanceResponse {
    /// Shape a measurement, echoing the raw request codes.
    pub fn new(zip1: String, zip2: String, m: &Measurement) -> Self {
        Self {
            zip1,
            zip2,
            coords: CoordsPair {
                zip1: LatLon {
                    lat: m.from.latitude,
                    lon: m.from.longitude,
                },
                zip2: LatLon {
                    lat: m.to.latitude,
                    lon: m.to.longitude,
                },
            },
            distance_km: m.distance.distance_km(),
            distance_miles: m.distance.distance_miles(),
            distance: PreferredDistance {
                value: m.distance.preferred(),
                units: m.distance.units().to_string(),
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub detail: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Dataset statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Country code of the loaded dataset.
    pub country: String,
    /// Number of distinct postal codes.
    pub postal_codes: u64,
    /// Postal codes without usable coordinates.
    pub without_coordinates: u64,
    /// Dataset rows ignored on load.
    pub skipped_rows: u64,
    /// Dataset rows merged into an earlier row with the same postal code.
    pub duplicate_rows: u64,
}

/// Get the distance between two postal codes.
///
/// # Query Parameters
///
/// - `zip1`, `zip2`: postal codes (required)
/// - `units`: "miles" (default) or "km"
///
/// # Returns
///
/// - `200 OK` with the distance on success
/// - `400 Bad Request` if a postal code is empty
/// - `404 Not Found` if a postal code is unknown or has no coordinates
/// - `422 Unprocessable Entity` if `zip1` or `zip2` is missing
/// - `500 Internal Server Error` if the dataset holds unusable coordinates
#[utoipa::path(
    get,
    path = "/distance",
    tag = "distance",
    params(DistanceQuery),
    responses(
        (status = 200, description = "Distance between the postal codes", body = DistanceResponse),
        (status = 400, description = "Empty postal code", body = ErrorResponse),
        (status = 404, description = "Unknown postal code", body = ErrorResponse),
        (status = 422, description = "Missing or malformed parameters", body = ErrorResponse),
        (status = 500, description = "Unusable dataset coordinates", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_distance(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DistanceQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => distance_response(&state, query),
        Err(rejection) => validation_error(rejection.body_text()),
    }
}

/// Get the distance between two postal codes from a JSON body.
///
/// Same semantics as `GET /distance`.
#[utoipa::path(
    post,
    path = "/distance",
    tag = "distance",
    request_body = DistanceQuery,
    responses(
        (status = 200, description = "Distance between the postal codes", body = DistanceResponse),
        (status = 400, description = "Empty postal code", body = ErrorResponse),
        (status = 404, description = "Unknown postal code", body = ErrorResponse),
        (status = 422, description = "Missing or malformed body", body = ErrorResponse),
        (status = 500, description = "Unusable dataset coordinates", body = ErrorResponse)
    )
)]
pub async fn post_distance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DistanceQuery>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(query)) => distance_response(&state, query),
        Err(rejection) => validation_error(rejection.body_text()),
    }
}

fn distance_response(state: &AppState, query: DistanceQuery) -> Response {
    let units = Units::from_preference(query.units.as_deref());

    tracing::debug!(
        zip1 = %query.zip1,
        zip2 = %query.zip2,
        units = %units,
        "Distance query"
    );

    match state.resolver.measure(&query.zip1, &query.zip2, units) {
        Ok(measurement) => {
            let response = DistanceResponse::new(query.zip1, query.zip2, &measurement);
            tracing::info!(
                zip1 = %response.zip1,
                zip2 = %response.zip2,
                distance_km = response.distance_km,
                "Distance computed"
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&query.zip1, &query.zip2, e),
    }
}

/// Map a resolution failure to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create an error response for distance queries.
fn error_response(zip1: &str, zip2: &str, e: ZipError) -> Response {
    let status = status_for(e.kind());

    tracing::warn!(zip1 = zip1, zip2 = zip2, error = %e, "Distance query failed");

    (
        status,
        Json(ErrorResponse {
            detail: e.to_string(),
        }),
    )
        .into_response()
}

fn validation_error(detail: String) -> Response {
    tracing::debug!(detail = %detail, "Rejected malformed distance request");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse { detail }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get dataset statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses((status = 200, description = "Loaded dataset statistics", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = &state.dataset_stats;

    Json(StatsResponse {
        country: stats.country.clone(),
        postal_codes: stats.postal_codes,
        without_coordinates: stats.without_coordinates,
        skipped_rows: stats.skipped_rows,
        duplicate_rows: stats.duplicate_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipdist::{compute, Coordinate};

    #[test]
    fn test_distance_query_deserialize() {
        let json = r#"{"zip1": "90210", "zip2": "10001"}"#;
        let query: DistanceQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.zip1, "90210");
        assert_eq!(query.zip2, "10001");
        assert_eq!(query.units, None);

        let json = r#"{"zip1": "90210", "zip2": "10001", "units": null}"#;
        let query: DistanceQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.units, None);

        let json = r#"{"zip1": "90210", "zip2": "10001", "units": "KM"}"#;
        let query: DistanceQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.units.as_deref(), Some("KM"));
    }

    #[test]
    fn test_distance_response_field_order() {
        let from = Coordinate::new(34.0901, -118.4065);
        let to = Coordinate::new(40.7484, -73.9967);
        let m = Measurement {
            from,
            to,
            distance: compute(from, to, Units::Km),
        };
        let response = DistanceResponse::new(" 90210 ".to_string(), "10001".to_string(), &m);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.starts_with(r#"{"zip1":" 90210 ","zip2":"10001","coords":{"zip1":{"lat":34.0901,"lon":-118.4065}"#));
        assert!(json.contains(r#""distance_km":3948.2434,"distance_miles":2453.3247"#));
        assert!(json.ends_with(r#""distance":{"value":3948.2434,"units":"km"}}"#));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
