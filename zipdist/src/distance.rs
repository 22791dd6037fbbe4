//! Great-circle distance between coordinates.
//!
//! Distances are computed with the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`] (the IUGG mean Earth radius). Miles are always derived
//! from the unrounded kilometer value; rounding to [`OUTPUT_DECIMALS`] places
//! happens only when a value is read for presentation.

use std::fmt;

use crate::coordinate::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometer to statute mile conversion factor.
pub const KM_TO_MILES: f64 = 0.62137119;

/// Decimal places used for reported distances.
pub const OUTPUT_DECIMALS: usize = 4;

/// Unit of the preferred distance value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Statute miles.
    #[default]
    Miles,
    /// Kilometers.
    Km,
}

impl Units {
    /// Parse a unit preference.
    ///
    /// Only a case-insensitive `"km"` selects kilometers; anything else,
    /// including `None` and the empty string, selects miles.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipdist::Units;
    ///
    /// assert_eq!(Units::from_preference(Some("KM")), Units::Km);
    /// assert_eq!(Units::from_preference(Some("miles")), Units::Miles);
    /// assert_eq!(Units::from_preference(Some("meters")), Units::Miles);
    /// assert_eq!(Units::from_preference(None), Units::Miles);
    /// ```
    pub fn from_preference(units: Option<&str>) -> Self {
        match units {
            Some(u) if u.to_lowercase() == "km" => Units::Km,
            _ => Units::Miles,
        }
    }

    /// Wire name of the unit (`"km"` or `"miles"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Miles => "miles",
            Units::Km => "km",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a distance calculation.
///
/// Holds the unrounded values; the accessors round for output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceResult {
    km: f64,
    miles: f64,
    units: Units,
}

impl DistanceResult {
    /// Unrounded distance in kilometers.
    pub fn km(&self) -> f64 {
        self.km
    }

    /// Unrounded distance in miles.
    pub fn miles(&self) -> f64 {
        self.miles
    }

    /// Distance in kilometers rounded to [`OUTPUT_DECIMALS`] places.
    pub fn distance_km(&self) -> f64 {
        round_to(self.km, OUTPUT_DECIMALS)
    }

    /// Distance in miles rounded to [`OUTPUT_DECIMALS`] places.
    pub fn distance_miles(&self) -> f64 {
        round_to(self.miles, OUTPUT_DECIMALS)
    }

    /// The unit selected when the result was computed.
    pub fn units(&self) -> Units {
        self.units
    }

    /// Rounded distance in the selected unit.
    pub fn preferred(&self) -> f64 {
        match self.units {
            Units::Km => self.distance_km(),
            Units::Miles => self.distance_miles(),
        }
    }
}

/// Haversine distance in kilometers between two coordinates.
///
/// # Examples
///
/// ```
/// use zipdist::{distance::haversine_km, Coordinate};
///
/// let p = Coordinate::new(40.7484, -73.9967);
/// assert_eq!(haversine_km(p, p), 0.0);
/// ```
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lon1 = from.longitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let lon2 = to.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Compute the distance between two coordinates in both units.
///
/// `units` only selects which value [`DistanceResult::preferred`] returns;
/// both kilometers and miles are always computed.
pub fn compute(from: Coordinate, to: Coordinate, units: Units) -> DistanceResult {
    let km = haversine_km(from, to);
    DistanceResult {
        km,
        miles: km * KM_TO_MILES,
        units,
    }
}

/// Round to a number of decimal places, half-to-even on the exact decimal
/// expansion of `value`.
///
/// Goes through the formatter so that values such as `2.675` (stored as
/// `2.67499999…`) round the way their binary value dictates.
///
/// # Examples
///
/// ```
/// use zipdist::distance::round_to;
///
/// assert_eq!(round_to(3948.243433257425, 4), 3948.2434);
/// assert_eq!(round_to(2.675, 2), 2.67);
/// ```
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beverly_hills() -> Coordinate {
        Coordinate::new(34.0901, -118.4065)
    }

    fn new_york() -> Coordinate {
        Coordinate::new(40.7484, -73.9967)
    }

    /// Number of digits after the decimal point in the shortest representation.
    fn decimals(value: f64) -> usize {
        let s = value.to_string();
        s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }

    #[test]
    fn test_identical_points_are_zero() {
        for p in [beverly_hills(), new_york(), Coordinate::new(0.0, 0.0)] {
            let result = compute(p, p, Units::Km);
            assert_eq!(result.km(), 0.0);
            assert_eq!(result.miles(), 0.0);
            assert_eq!(result.distance_km(), 0.0);
            assert_eq!(result.distance_miles(), 0.0);
            assert!(!result.km().is_nan());
        }
    }

    #[test]
    fn test_known_distance() {
        let result = compute(beverly_hills(), new_york(), Units::Km);
        assert!((result.km() - 3948.2434).abs() < 1e-3);
        assert_eq!(result.distance_km(), 3948.2434);
        assert_eq!(result.distance_miles(), 2453.3247);
    }

    #[test]
    fn test_symmetry() {
        let ab = compute(beverly_hills(), new_york(), Units::Miles);
        let ba = compute(new_york(), beverly_hills(), Units::Miles);
        assert!((ab.km() - ba.km()).abs() < 1e-9);
        assert_eq!(ab.distance_km(), ba.distance_km());
        assert_eq!(ab.distance_miles(), ba.distance_miles());
    }

    #[test]
    fn test_miles_from_unrounded_km() {
        let result = compute(beverly_hills(), new_york(), Units::Miles);
        assert_eq!(
            result.distance_miles(),
            round_to(result.km() * KM_TO_MILES, OUTPUT_DECIMALS)
        );
        assert_eq!(result.miles(), result.km() * KM_TO_MILES);
    }

    #[test]
    fn test_antipodal_points() {
        let result = compute(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 180.0),
            Units::Km,
        );
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((result.km() - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_rounding_precision() {
        let pairs = [
            (beverly_hills(), new_york()),
            (Coordinate::new(40.7484, -73.9967), Coordinate::new(40.7069, -74.0113)),
            (Coordinate::new(-33.8688, 151.2093), Coordinate::new(51.5074, -0.1278)),
        ];
        for (a, b) in pairs {
            for units in [Units::Km, Units::Miles] {
                let result = compute(a, b, units);
                assert!(decimals(result.distance_km()) <= 4);
                assert!(decimals(result.distance_miles()) <= 4);
                assert!(decimals(result.preferred()) <= 4);
            }
        }
    }

    #[test]
    fn test_preferred_value() {
        let km = compute(beverly_hills(), new_york(), Units::Km);
        assert_eq!(km.units(), Units::Km);
        assert_eq!(km.preferred(), km.distance_km());

        let miles = compute(beverly_hills(), new_york(), Units::Miles);
        assert_eq!(miles.units(), Units::Miles);
        assert_eq!(miles.preferred(), miles.distance_miles());

        // The preference never changes the computed values
        assert_eq!(km.distance_km(), miles.distance_km());
        assert_eq!(km.distance_miles(), miles.distance_miles());
    }

    #[test]
    fn test_units_case_insensitive() {
        assert_eq!(Units::from_preference(Some("km")), Units::Km);
        assert_eq!(Units::from_preference(Some("KM")), Units::Km);
        assert_eq!(Units::from_preference(Some("Km")), Units::Km);
        assert_eq!(Units::from_preference(Some("kM")), Units::Km);
    }

    #[test]
    fn test_units_default_to_miles() {
        assert_eq!(Units::from_preference(None), Units::Miles);
        assert_eq!(Units::from_preference(Some("")), Units::Miles);
        assert_eq!(Units::from_preference(Some("miles")), Units::Miles);
        assert_eq!(Units::from_preference(Some("kilometers")), Units::Miles);
        assert_eq!(Units::from_preference(Some(" km")), Units::Miles);
        assert_eq!(Units::default(), Units::Miles);
    }

    #[test]
    fn test_units_display() {
        assert_eq!(Units::Km.to_string(), "km");
        assert_eq!(Units::Miles.to_string(), "miles");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456789, 4), 1.2346);
        assert_eq!(round_to(1.0, 4), 1.0);
        assert_eq!(round_to(0.0, 4), 0.0);
        assert_eq!(round_to(-1.23456, 4), -1.2346);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert!(round_to(f64::NAN, 4).is_nan());
    }
}
