//! Postal code dataset download.
//!
//! This module fetches GeoNames country archives (`{COUNTRY}.zip`) and
//! extracts the `{COUNTRY}.txt` export into the data directory. It is only
//! available when the `download` feature is enabled.
//!
//! The download happens at most once per data directory: an existing
//! `{COUNTRY}.txt` is never fetched again.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::dataset::{extract_country_file, write_atomically};
use crate::error::{Result, ZipError};

/// GeoNames postal code export location.
pub const GEONAMES_URL_TEMPLATE: &str = "https://download.geonames.org/export/zip/{country}.zip";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for downloading postal code datasets.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// URL template; `{country}` is replaced with the upper-case country code.
    pub url_template: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of retry attempts on failure.
    pub max_retries: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self::geonames()
    }
}

impl DownloadConfig {
    /// Download from the public GeoNames export server.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use zipdist::download::DownloadConfig;
    ///
    /// let config = DownloadConfig::geonames();
    /// // Downloads https://download.geonames.org/export/zip/US.zip
    /// ```
    pub fn geonames() -> Self {
        Self::with_url_template(GEONAMES_URL_TEMPLATE)
    }

    /// Download from a custom location serving GeoNames-format ZIP archives.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use zipdist::download::DownloadConfig;
    ///
    /// let config = DownloadConfig::with_url_template("https://mirror.example.com/zip/{country}.zip");
    /// ```
    pub fn with_url_template(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 3,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Outcome of a failed download attempt.
enum AttemptError {
    /// Transport failure or server-side status; worth another attempt.
    Transient(ZipError),
    /// Client-side status or a bad archive; retrying cannot help.
    Permanent(ZipError),
}

/// Postal code dataset downloader.
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    /// Create a new downloader with the given configuration.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ZipError::DownloadFailed {
                country: String::new(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Download the dataset for `country` into `dest_dir`.
    ///
    /// # Returns
    ///
    /// The path to the extracted `{COUNTRY}.txt` file.
    pub fn download_country(&self, country: &str, dest_dir: &Path) -> Result<PathBuf> {
        let country = country.trim().to_uppercase();
        let dest_path = dest_dir.join(format!("{}.txt", country));

        // Skip if file already exists
        if dest_path.exists() {
            return Ok(dest_path);
        }

        let url = self.build_url(&country)?;
        fs::create_dir_all(dest_dir)?;

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(500 * attempt as u64));
            }

            match self.do_download(&url, &country, &dest_path) {
                Ok(()) => return Ok(dest_path),
                Err(AttemptError::Permanent(e)) => return Err(e),
                Err(AttemptError::Transient(e)) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ZipError::DownloadFailed {
            country,
            reason: "Unknown error".to_string(),
        }))
    }

    /// Build the download URL for a country.
    fn build_url(&self, country: &str) -> Result<String> {
        if self.config.url_template.is_empty() {
            return Err(ZipError::DownloadFailed {
                country: country.to_string(),
                reason: "No download URL template configured".to_string(),
            });
        }
        Ok(self.config.url_template.replace("{country}", country))
    }

    fn do_download(
        &self,
        url: &str,
        country: &str,
        dest_path: &Path,
    ) -> std::result::Result<(), AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AttemptError::Transient(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let error = ZipError::DownloadFailed {
                country: country.to_string(),
                reason: format!("HTTP {} from {}", status, url),
            };
            return Err(if status.is_server_error() {
                AttemptError::Transient(error)
            } else {
                AttemptError::Permanent(error)
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| AttemptError::Transient(e.into()))?;
        let contents = extract_country_file(Cursor::new(bytes.as_ref()), country, Path::new(url))
            .map_err(AttemptError::Permanent)?;
        write_atomically(dest_path, &contents).map_err(AttemptError::Permanent)?;

        Ok(())
    }
}
