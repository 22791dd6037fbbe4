pub mod distance;
pub mod download;
pub mod info;
pub mod lookup;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use zipdist::{download::DownloadConfig, GeoNamesDataset, GeoNamesDatasetBuilder};

/// Resolve the data directory from the flag/env value.
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    data_dir.context(
        "ZIPDIST_DATA_DIR environment variable not set. Use --data-dir or set ZIPDIST_DATA_DIR",
    )
}

/// Spinner on stderr so JSON output on stdout stays clean.
pub fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Load the country dataset, downloading it first if requested.
pub fn load_dataset(
    data_dir: Option<PathBuf>,
    country: &str,
    auto_download: bool,
) -> Result<GeoNamesDataset> {
    let mut builder = GeoNamesDatasetBuilder::new(resolve_data_dir(data_dir)?).country(country);

    if auto_download {
        builder = builder.auto_download(DownloadConfig::geonames());
    }

    let pb = spinner(&format!("Loading {} postal codes", builder.get_country()))?;
    let dataset = builder.build();
    pb.finish_and_clear();

    dataset.context("Failed to load postal code dataset")
}
