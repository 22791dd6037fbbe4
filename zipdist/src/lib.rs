//! # zipdist - Postal Code Distance Library
//!
//! Resolves postal (ZIP) codes to coordinates using a GeoNames postal code
//! export and computes the great-circle distance between them.
//!
//! ## Features
//!
//! - **Offline**: Works from a local `{COUNTRY}.txt` or `{COUNTRY}.zip` export
//! - **Typed failures**: Empty, unknown, coordinate-less and malformed codes are distinct errors
//! - **Exact output**: Haversine distances in kilometers and miles, rounded to 4 places
//! - **Download** (feature `download`): Fetches the country export from GeoNames on first use
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use zipdist::{GeoNamesDatasetBuilder, Resolver, Units};
//!
//! let dataset = GeoNamesDatasetBuilder::new("/data/zip").country("US").build()?;
//! let resolver = Resolver::new(Arc::new(dataset));
//!
//! let m = resolver.measure("90210", "10001", Units::Miles)?;
//! println!("{} {}", m.distance.preferred(), m.distance.units());
//! ```
//!
//! ## Data Sources
//!
//! Postal code exports are published per country at
//! <https://download.geonames.org/export/zip/>.

pub mod coordinate;
pub mod dataset;
pub mod distance;
#[cfg(feature = "download")]
pub mod download;
pub mod error;
pub mod postal;
pub mod resolver;

// Re-export main types at crate root for convenience
pub use coordinate::Coordinate;
pub use dataset::{
    DatasetStats, GeoNamesDataset, GeoNamesDatasetBuilder, PostalLookup, PostalRecord,
    DEFAULT_COUNTRY,
};
pub use distance::{compute, DistanceResult, Units};
pub use error::{ErrorKind, Result, ZipError};
pub use resolver::{Measurement, Resolver};
