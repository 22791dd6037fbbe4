use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use zipdist::{Measurement, Resolver, Units};

/// One flat JSON object per invocation.
#[derive(Serialize)]
struct DistanceOutput<'a> {
    zip1: &'a str,
    zip2: &'a str,
    distance: f64,
    units: &'static str,
}

impl<'a> DistanceOutput<'a> {
    fn new(zip1: &'a str, zip2: &'a str, measurement: &Measurement) -> Self {
        Self {
            zip1,
            zip2,
            distance: measurement.distance.preferred(),
            units: measurement.distance.units().as_str(),
        }
    }
}

pub fn run(
    data_dir: Option<PathBuf>,
    country: &str,
    auto_download: bool,
    zip1: &str,
    zip2: &str,
    units: Option<&str>,
    json: bool,
) -> Result<()> {
    let dataset = super::load_dataset(data_dir, country, auto_download)?;
    let resolver = Resolver::new(Arc::new(dataset));

    let m = resolver
        .measure(zip1, zip2, Units::from_preference(units))
        .context("Failed to compute distance")?;

    if json {
        let output = DistanceOutput::new(zip1, zip2, &m);
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} {}", m.distance.preferred(), m.distance.units());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipdist::{compute, Coordinate};

    #[test]
    fn test_json_output_is_flat() {
        let from = Coordinate::new(34.0901, -118.4065);
        let to = Coordinate::new(40.7484, -73.9967);
        let m = Measurement {
            from,
            to,
            distance: compute(from, to, Units::Km),
        };

        let json = serde_json::to_value(DistanceOutput::new("90210", "10001", &m)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "zip1": "90210",
                "zip2": "10001",
                "distance": m.distance.distance_km(),
                "units": "km",
            })
        );
    }
}
