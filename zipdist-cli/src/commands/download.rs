use anyhow::{Context, Result};
use std::path::PathBuf;
use zipdist::download::{DownloadConfig, Downloader};

pub fn run(data_dir: Option<PathBuf>, country: &str, url: Option<String>) -> Result<()> {
    let dir = super::resolve_data_dir(data_dir)?;

    let config = match url {
        Some(template) => DownloadConfig::with_url_template(template),
        None => DownloadConfig::geonames(),
    };
    let downloader = Downloader::new(config).context("Failed to create downloader")?;

    let pb = super::spinner(&format!("Downloading {} postal codes", country.to_uppercase()))?;
    let result = downloader.download_country(country, &dir);
    pb.finish_and_clear();

    let path = result.context("Failed to download dataset")?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    println!("Dataset: {}", path.display());
    println!("Size: {}", format_size(size));

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
