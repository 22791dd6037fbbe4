//! Basic example demonstrating zipdist library usage.
//!
//! Run with: cargo run --example basic -- /path/to/geonames/dir

use std::env;
use std::sync::Arc;

use zipdist::{GeoNamesDatasetBuilder, Resolver, Units, ZipError};

fn main() -> Result<(), ZipError> {
    // Get data directory from command line
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/geonames/dir");
        std::process::exit(1);
    });

    let dataset = GeoNamesDatasetBuilder::new(&data_dir).country("US").build()?;
    println!("Loaded {} postal codes", dataset.len());

    let resolver = Resolver::new(Arc::new(dataset));

    let pairs = [
        ("Beverly Hills -> Manhattan", "90210", "10001"),
        ("Chicago -> Seattle", "60601", "98101"),
        ("Unknown code", "00000", "10001"),
    ];

    println!("{:-<50}", "");

    for (name, zip1, zip2) in &pairs {
        match resolver.measure(zip1, zip2, Units::Km) {
            Ok(m) => {
                println!(
                    "{}: {} km ({} miles)",
                    name,
                    m.distance.distance_km(),
                    m.distance.distance_miles()
                );
            }
            Err(e) => {
                println!("{}: error - {}", name, e);
            }
        }
    }

    Ok(())
}
