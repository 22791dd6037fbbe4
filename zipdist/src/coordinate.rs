//! Geographic coordinates.

/// A resolved latitude/longitude pair in decimal degrees (WGS84).
///
/// Only produced by [`Resolver`](crate::Resolver), which guarantees both
/// components are finite and within range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and inside their valid ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipdist::Coordinate;
    ///
    /// assert!(Coordinate::new(34.0901, -118.4065).is_valid());
    /// assert!(!Coordinate::new(91.0, 0.0).is_valid());
    /// assert!(!Coordinate::new(f64::INFINITY, 0.0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        is_valid_coord(self.latitude, self.longitude)
    }
}

/// Validate that a latitude/longitude pair is usable for distance calculation.
///
/// NaN and infinite values fail the range checks.
pub fn is_valid_coord(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
