use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use zipdist::{postal::normalize_postal_code, PostalLookup, Resolver};

#[derive(Serialize)]
struct LookupOutput<'a> {
    zip: &'a str,
    lat: f64,
    lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    place: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    county: Option<&'a str>,
}

pub fn run(
    data_dir: Option<PathBuf>,
    country: &str,
    auto_download: bool,
    zip: &str,
    json: bool,
) -> Result<()> {
    let dataset = Arc::new(super::load_dataset(data_dir, country, auto_download)?);
    let resolver = Resolver::new(dataset.clone());

    let coord = resolver
        .resolve(zip)
        .context("Failed to resolve postal code")?;

    // resolve() succeeded, so the code normalizes and has a record
    let record = normalize_postal_code(zip).and_then(|code| dataset.lookup(code));

    let place = record.map(|r| r.place_name.as_str()).filter(|s| !s.is_empty());
    let state = record.map(|r| r.state_code.as_str()).filter(|s| !s.is_empty());
    let county = record.map(|r| r.county_name.as_str()).filter(|s| !s.is_empty());

    if json {
        let output = LookupOutput {
            zip: zip.trim(),
            lat: coord.latitude,
            lon: coord.longitude,
            place,
            state,
            county,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let location = match (place, state) {
            (Some(place), Some(state)) => format!("{}, {}", place, state),
            (Some(place), None) => place.to_string(),
            (None, Some(state)) => state.to_string(),
            (None, None) => String::new(),
        };
        println!(
            "{:<8} {:>10} {:>11}  {}",
            zip.trim(),
            coord.latitude,
            coord.longitude,
            location
        );
    }

    Ok(())
}
