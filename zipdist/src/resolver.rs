//! Postal code to coordinate resolution.
//!
//! [`Resolver`] turns a raw postal code string into a [`Coordinate`] using an
//! injected [`PostalLookup`] provider, and measures the distance between two
//! codes.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zipdist::{GeoNamesDatasetBuilder, Resolver, Units};
//!
//! let dataset = GeoNamesDatasetBuilder::new("/data/zip").build()?;
//! let resolver = Resolver::new(Arc::new(dataset));
//!
//! let measurement = resolver.measure("90210", "10001", Units::Km)?;
//! println!("{} km", measurement.distance.distance_km());
//! ```

use std::sync::Arc;

use crate::coordinate::{is_valid_coord, Coordinate};
use crate::dataset::PostalLookup;
use crate::distance::{compute, DistanceResult, Units};
use crate::error::{Result, ZipError};
use crate::postal::normalize_postal_code;

/// Both resolved endpoints and the distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Coordinate of the first postal code.
    pub from: Coordinate,
    /// Coordinate of the second postal code.
    pub to: Coordinate,
    /// Distance between them.
    pub distance: DistanceResult,
}

/// Resolves postal codes against a read-only dataset.
///
/// Cheap to clone; clones share the same provider.
#[derive(Clone)]
pub struct Resolver {
    provider: Arc<dyn PostalLookup>,
}

impl Resolver {
    /// Create a resolver over an already-loaded provider.
    pub fn new(provider: Arc<dyn PostalLookup>) -> Self {
        Self { provider }
    }

    /// Resolve a postal code to its coordinate.
    ///
    /// The code is trimmed and cut to its first 5 characters before the
    /// lookup. Error messages carry the trimmed (but not truncated) input.
    ///
    /// # Errors
    ///
    /// - [`ZipError::EmptyCode`] if nothing is left after trimming
    /// - [`ZipError::NotFound`] if the dataset has no record
    /// - [`ZipError::NoCoordinates`] if the record's latitude or longitude is missing or NaN
    /// - [`ZipError::MalformedCoordinates`] if the coordinates are infinite or out of range
    pub fn resolve(&self, code: &str) -> Result<Coordinate> {
        let zip5 = normalize_postal_code(code).ok_or(ZipError::EmptyCode)?;
        let trimmed = code.trim();

        let record = self
            .provider
            .lookup(zip5)
            .ok_or_else(|| ZipError::NotFound {
                code: trimmed.to_string(),
            })?;

        let (latitude, longitude) = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) if !lat.is_nan() && !lon.is_nan() => (lat, lon),
            _ => {
                return Err(ZipError::NoCoordinates {
                    code: trimmed.to_string(),
                })
            }
        };

        if !is_valid_coord(latitude, longitude) {
            return Err(ZipError::MalformedCoordinates {
                code: trimmed.to_string(),
            });
        }

        Ok(Coordinate::new(latitude, longitude))
    }

    /// Resolve two postal codes and compute the distance between them.
    ///
    /// `zip1` is resolved first; if it fails, `zip2` is not looked up and
    /// `zip1`'s error is returned.
    pub fn measure(&self, zip1: &str, zip2: &str, units: Units) -> Result<Measurement> {
        let from = self.resolve(zip1)?;
        let to = self.resolve(zip2)?;

        Ok(Measurement {
            from,
            to,
            distance: compute(from, to, units),
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::US_SAMPLE;
    use crate::dataset::{GeoNamesDataset, PostalRecord};
    use crate::distance::haversine_km;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_resolver() -> Resolver {
        let dataset = GeoNamesDataset::from_reader("US", US_SAMPLE.as_bytes()).unwrap();
        Resolver::new(Arc::new(dataset))
    }

    fn record(lat: Option<f64>, lon: Option<f64>) -> PostalRecord {
        PostalRecord {
            country_code: "US".to_string(),
            postal_code: "12345".to_string(),
            latitude: lat,
            longitude: lon,
            ..Default::default()
        }
    }

    fn single_record_resolver(lat: Option<f64>, lon: Option<f64>) -> Resolver {
        let mut map = HashMap::new();
        map.insert("12345".to_string(), record(lat, lon));
        Resolver::new(Arc::new(map))
    }

    /// Provider that counts lookups.
    struct CountingLookup {
        inner: HashMap<String, PostalRecord>,
        calls: AtomicUsize,
    }

    impl PostalLookup for CountingLookup {
        fn lookup(&self, postal_code: &str) -> Option<&PostalRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(postal_code)
        }
    }

    #[test]
    fn test_resolve_known_code() {
        let resolver = sample_resolver();
        let coord = resolver.resolve("90210").unwrap();
        assert_eq!(coord, Coordinate::new(34.0901, -118.4065));
    }

    #[test]
    fn test_resolve_normalizes_input() {
        let resolver = sample_resolver();
        assert_eq!(
            resolver.resolve("  10001-0001 ").unwrap(),
            Coordinate::new(40.7484, -73.9967)
        );
        assert_eq!(
            resolver.resolve("100019999").unwrap(),
            Coordinate::new(40.7484, -73.9967)
        );
    }

    #[test]
    fn test_resolve_empty() {
        let resolver = sample_resolver();
        assert!(matches!(resolver.resolve(""), Err(ZipError::EmptyCode)));
        assert!(matches!(resolver.resolve("   "), Err(ZipError::EmptyCode)));
    }

    #[test]
    fn test_empty_never_reaches_provider() {
        let provider = Arc::new(CountingLookup {
            inner: HashMap::new(),
            calls: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(provider.clone());

        let _ = resolver.resolve(" \t ");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let _ = resolver.resolve("00000");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_not_found() {
        let resolver = sample_resolver();
        match resolver.resolve(" 00000 ") {
            Err(ZipError::NotFound { code }) => assert_eq!(code, "00000"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message_keeps_full_trimmed_input() {
        let resolver = sample_resolver();
        let err = resolver.resolve(" 00000-1234 ").unwrap_err();
        assert_eq!(err.to_string(), "ZIP code not found: 00000-1234");
    }

    #[test]
    fn test_resolve_missing_coordinates() {
        let resolver = sample_resolver();
        match resolver.resolve("96799") {
            Err(ZipError::NoCoordinates { code }) => assert_eq!(code, "96799"),
            other => panic!("Expected NoCoordinates, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_nan_coordinates() {
        let resolver = single_record_resolver(Some(f64::NAN), Some(-70.0));
        assert!(matches!(
            resolver.resolve("12345"),
            Err(ZipError::NoCoordinates { .. })
        ));

        let resolver = single_record_resolver(Some(40.0), None);
        assert!(matches!(
            resolver.resolve("12345"),
            Err(ZipError::NoCoordinates { .. })
        ));
    }

    #[test]
    fn test_resolve_malformed_coordinates() {
        let resolver = single_record_resolver(Some(f64::INFINITY), Some(-70.0));
        assert!(matches!(
            resolver.resolve("12345"),
            Err(ZipError::MalformedCoordinates { .. })
        ));

        let resolver = single_record_resolver(Some(40.0), Some(-270.0));
        let err = resolver.resolve("12345").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse coordinates for ZIP: 12345");
    }

    #[test]
    fn test_measure() {
        let resolver = sample_resolver();
        let m = resolver.measure("90210", "10001", Units::Km).unwrap();

        assert_eq!(m.from, Coordinate::new(34.0901, -118.4065));
        assert_eq!(m.to, Coordinate::new(40.7484, -73.9967));
        assert_eq!(m.distance.units(), Units::Km);

        let expected = haversine_km(m.from, m.to);
        assert!((m.distance.distance_km() - expected).abs() < 1.0);
        assert!((3930.0..3960.0).contains(&m.distance.distance_km()));
    }

    #[test]
    fn test_measure_same_code() {
        let resolver = sample_resolver();
        let m = resolver.measure("10001", " 10001 ", Units::Miles).unwrap();
        assert_eq!(m.distance.distance_km(), 0.0);
        assert_eq!(m.distance.distance_miles(), 0.0);
    }

    #[test]
    fn test_measure_reports_first_failure() {
        let resolver = sample_resolver();

        // Both invalid: zip1's error wins
        let err = resolver.measure("", "00000", Units::Miles).unwrap_err();
        assert!(matches!(err, ZipError::EmptyCode));

        let err = resolver.measure("00000", "", Units::Miles).unwrap_err();
        assert!(matches!(err, ZipError::NotFound { .. }));

        // Only zip2 invalid
        let err = resolver.measure("10001", "96799", Units::Miles).unwrap_err();
        assert!(matches!(err, ZipError::NoCoordinates { .. }));
    }

    #[test]
    fn test_zip2_not_consulted_after_zip1_failure() {
        let provider = Arc::new(CountingLookup {
            inner: HashMap::new(),
            calls: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(provider.clone());

        assert!(resolver.measure("00000", "11111", Units::Miles).is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
