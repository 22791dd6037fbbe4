//! Postal code reference dataset.
//!
//! This module provides [`PostalLookup`], the read-only interface the
//! [`Resolver`](crate::Resolver) queries, and [`GeoNamesDataset`], an
//! in-memory implementation backed by a GeoNames postal code export.
//!
//! # Dataset Format
//!
//! GeoNames publishes one tab-separated file per country (`US.txt`, usually
//! shipped inside `US.zip`) without a header row:
//!
//! ```text
//! country code, postal code, place name,
//! admin name1, admin code1, admin name2, admin code2, admin name3, admin code3,
//! latitude, longitude, accuracy
//! ```
//!
//! # Loading
//!
//! ```ignore
//! use zipdist::GeoNamesDatasetBuilder;
//!
//! // Loads /data/zip/US.txt, extracting it from US.zip if needed
//! let dataset = GeoNamesDatasetBuilder::new("/data/zip")
//!     .country("US")
//!     .build()?;
//! println!("{} postal codes", dataset.len());
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{Result, ZipError};
use crate::postal::dataset_key;

#[cfg(feature = "download")]
use crate::download::{DownloadConfig, Downloader};

/// Country used when none is configured.
pub const DEFAULT_COUNTRY: &str = "US";

/// Minimum number of columns a row needs to carry coordinates.
const MIN_COLUMNS: usize = 11;

/// A single postal code entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostalRecord {
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Postal code as stored in the dataset.
    pub postal_code: String,
    /// Place (city/town) name.
    pub place_name: String,
    /// First-level administrative division name (state).
    pub state_name: String,
    /// First-level administrative division code (e.g. "CA").
    pub state_code: String,
    /// Second-level administrative division name (county).
    pub county_name: String,
    /// Latitude in decimal degrees, `None` when the dataset has no value.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, `None` when the dataset has no value.
    pub longitude: Option<f64>,
    /// GeoNames accuracy level (1 = estimated, 4 = geonameid, 6 = centroid).
    pub accuracy: Option<u8>,
}

impl PostalRecord {
    /// Whether both coordinates are present and not NaN.
    pub fn has_coordinates(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lon)) if !lat.is_nan() && !lon.is_nan()
        )
    }
}

/// Read-only postal code lookup.
///
/// Implementations are queried concurrently and must not require mutation.
/// `postal_code` is already normalized (trimmed, at most 5 characters).
pub trait PostalLookup: Send + Sync {
    /// Return the record for a postal code, or `None` if unknown.
    fn lookup(&self, postal_code: &str) -> Option<&PostalRecord>;
}

impl PostalLookup for HashMap<String, PostalRecord> {
    fn lookup(&self, postal_code: &str) -> Option<&PostalRecord> {
        self.get(postal_code)
    }
}

/// Statistics gathered while loading a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Country the dataset was loaded for.
    pub country: String,
    /// Number of distinct postal codes.
    pub postal_codes: u64,
    /// Postal codes whose merged record has no usable coordinates.
    pub without_coordinates: u64,
    /// Rows ignored because they were short, empty, or for another country.
    pub skipped_rows: u64,
    /// Rows merged into an earlier row with the same postal code.
    pub duplicate_rows: u64,
}

/// In-memory postal code dataset for a single country.
///
/// Duplicate postal codes are merged on load: the coordinates become the mean
/// of the rows that carry them, other fields come from the first row.
///
/// # Example
///
/// ```ignore
/// use zipdist::{GeoNamesDataset, PostalLookup};
///
/// let dataset = GeoNamesDataset::from_file("US", "/data/zip/US.txt")?;
/// if let Some(record) = dataset.lookup("90210") {
///     println!("{}, {}", record.place_name, record.state_code);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GeoNamesDataset {
    country: String,
    records: HashMap<String, PostalRecord>,
    stats: DatasetStats,
}

impl GeoNamesDataset {
    /// Create a builder for loading from a data directory.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> GeoNamesDatasetBuilder {
        GeoNamesDatasetBuilder::new(data_dir)
    }

    /// Parse a GeoNames tab-separated export.
    ///
    /// Rows whose country code differs from `country` are skipped.
    pub fn from_reader<R: Read>(country: &str, reader: R) -> Result<Self> {
        let country = normalize_country(country);
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut merger = RecordMerger::default();
        let mut skipped_rows = 0u64;

        for row in csv_reader.records() {
            let row = row?;
            match parse_row(&row) {
                Some(record) if record.country_code.eq_ignore_ascii_case(&country) => {
                    merger.push(record)
                }
                _ => skipped_rows += 1,
            }
        }

        let mut dataset = merger.finish(&country);
        dataset.stats.skipped_rows = skipped_rows;
        Ok(dataset)
    }

    /// Load a GeoNames export from a `.txt` file.
    pub fn from_file<P: AsRef<Path>>(country: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ZipError::DatasetNotFound {
                path: path.to_path_buf(),
            },
            _ => ZipError::Io(e),
        })?;
        Self::from_reader(country, BufReader::new(file))
    }

    /// Build a dataset from already-parsed records.
    ///
    /// Records are merged exactly as when loading from a file.
    pub fn from_records<I>(country: &str, records: I) -> Self
    where
        I: IntoIterator<Item = PostalRecord>,
    {
        let mut merger = RecordMerger::default();
        for record in records {
            merger.push(record);
        }
        merger.finish(&normalize_country(country))
    }

    /// Country code this dataset covers.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Number of distinct postal codes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no postal codes.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load statistics.
    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }
}

impl PostalLookup for GeoNamesDataset {
    fn lookup(&self, postal_code: &str) -> Option<&PostalRecord> {
        self.records.get(&dataset_key(postal_code))
    }
}

/// Running coordinate sums for one postal code.
#[derive(Debug)]
struct MergeEntry {
    record: PostalRecord,
    lat_sum: f64,
    lat_count: u32,
    lon_sum: f64,
    lon_count: u32,
}

impl MergeEntry {
    fn new(record: PostalRecord) -> Self {
        let mut entry = Self {
            record,
            lat_sum: 0.0,
            lat_count: 0,
            lon_sum: 0.0,
            lon_count: 0,
        };
        let (lat, lon) = (entry.record.latitude, entry.record.longitude);
        entry.add(lat, lon);
        entry
    }

    /// NaN counts as missing, matching how the export marks absent values.
    fn add(&mut self, lat: Option<f64>, lon: Option<f64>) {
        if let Some(v) = lat.filter(|v| !v.is_nan()) {
            self.lat_sum += v;
            self.lat_count += 1;
        }
        if let Some(v) = lon.filter(|v| !v.is_nan()) {
            self.lon_sum += v;
            self.lon_count += 1;
        }
    }

    fn finish(mut self) -> PostalRecord {
        self.record.latitude = mean(self.lat_sum, self.lat_count);
        self.record.longitude = mean(self.lon_sum, self.lon_count);
        self.record
    }
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Default)]
struct RecordMerger {
    entries: HashMap<String, MergeEntry>,
    duplicate_rows: u64,
}

impl RecordMerger {
    fn push(&mut self, record: PostalRecord) {
        let key = dataset_key(record.postal_code.trim());
        if key.is_empty() {
            return;
        }
        match self.entries.get_mut(&key) {
            Some(entry) => {
                self.duplicate_rows += 1;
                entry.add(record.latitude, record.longitude);
            }
            None => {
                self.entries.insert(key, MergeEntry::new(record));
            }
        }
    }

    fn finish(self, country: &str) -> GeoNamesDataset {
        let records: HashMap<String, PostalRecord> = self
            .entries
            .into_iter()
            .map(|(key, entry)| (key, entry.finish()))
            .collect();

        let without_coordinates = records.values().filter(|r| !r.has_coordinates()).count();

        GeoNamesDataset {
            country: country.to_string(),
            stats: DatasetStats {
                country: country.to_string(),
                postal_codes: records.len() as u64,
                without_coordinates: without_coordinates as u64,
                skipped_rows: 0,
                duplicate_rows: self.duplicate_rows,
            },
            records,
        }
    }
}

/// Parse one export row. Returns `None` for rows that cannot carry a record.
fn parse_row(row: &csv::StringRecord) -> Option<PostalRecord> {
    if row.len() < MIN_COLUMNS {
        return None;
    }

    let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();

    let postal_code = field(1);
    if postal_code.is_empty() {
        return None;
    }

    Some(PostalRecord {
        country_code: field(0),
        postal_code,
        place_name: field(2),
        state_name: field(3),
        state_code: field(4),
        county_name: field(5),
        latitude: parse_coordinate(row.get(9)),
        longitude: parse_coordinate(row.get(10)),
        accuracy: row.get(11).and_then(|s| s.trim().parse().ok()),
    })
}

/// Empty or unparseable cells are treated as missing.
fn parse_coordinate(cell: Option<&str>) -> Option<f64> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

fn normalize_country(country: &str) -> String {
    country.trim().to_uppercase()
}

/// Extract `{COUNTRY}.txt` from a GeoNames ZIP archive.
///
/// `origin` only names the archive in error messages.
pub(crate) fn extract_country_file<R: Read + Seek>(
    reader: R,
    country: &str,
    origin: &Path,
) -> Result<Vec<u8>> {
    let archive_error = |reason: String| ZipError::Archive {
        path: origin.to_path_buf(),
        reason,
    };

    let mut archive =
        ZipArchive::new(reader).map_err(|e| archive_error(format!("Failed to read ZIP: {}", e)))?;

    let wanted = format!("{}.txt", normalize_country(country));
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_error(format!("Failed to read ZIP entry: {}", e)))?;

        let name = entry.name().rsplit('/').next().unwrap_or("");
        if name.eq_ignore_ascii_case(&wanted) {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            return Ok(contents);
        }
    }

    Err(archive_error(format!("No {} found in archive", wanted)))
}

/// Write `contents` to `path` through a `.tmp` sibling and a rename, so an
/// interrupted write never leaves a truncated dataset behind.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("txt.tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Builder for loading a [`GeoNamesDataset`] from a data directory.
///
/// # Example
///
/// ```ignore
/// use zipdist::GeoNamesDatasetBuilder;
///
/// let dataset = GeoNamesDatasetBuilder::new("/data/zip")
///     .country("US")
///     .build()?;
/// ```
///
/// # With Auto-Download (requires `download` feature)
///
/// ```ignore
/// use zipdist::{GeoNamesDatasetBuilder, download::DownloadConfig};
///
/// let dataset = GeoNamesDatasetBuilder::new("/data/zip")
///     .auto_download(DownloadConfig::geonames())
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct GeoNamesDatasetBuilder {
    data_dir: PathBuf,
    country: String,
    #[cfg(feature = "download")]
    download_config: Option<DownloadConfig>,
}

impl GeoNamesDatasetBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            country: DEFAULT_COUNTRY.to_string(),
            #[cfg(feature = "download")]
            download_config: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ZIPDIST_DATA_DIR` | Directory containing `{COUNTRY}.txt` or `.zip` | Required |
    /// | `ZIPDIST_COUNTRY` | Country code of the dataset | US |
    /// | `ZIPDIST_DOWNLOAD` | Download from GeoNames when missing ("true"/"1")* | false |
    /// | `ZIPDIST_DOWNLOAD_URL` | Custom archive URL template, `{country}` placeholder* | None |
    ///
    /// *Only used when `download` feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if `ZIPDIST_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("ZIPDIST_DATA_DIR").map_err(|_| {
            ZipError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "ZIPDIST_DATA_DIR environment variable not set",
            ))
        })?;

        Ok(Self::new(data_dir).apply_env())
    }

    /// Like [`from_env`](Self::from_env), but uses `default_data_dir` when
    /// `ZIPDIST_DATA_DIR` is not set. The other variables are still honoured.
    pub fn from_env_or<P: AsRef<Path>>(default_data_dir: P) -> Self {
        let data_dir = std::env::var_os("ZIPDIST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir.as_ref().to_path_buf());

        Self::new(data_dir).apply_env()
    }

    fn apply_env(mut self) -> Self {
        if let Some(country) = std::env::var("ZIPDIST_COUNTRY")
            .ok()
            .map(|c| normalize_country(&c))
            .filter(|c| !c.is_empty())
        {
            self.country = country;
        }

        #[cfg(feature = "download")]
        {
            self.download_config = match std::env::var("ZIPDIST_DOWNLOAD_URL") {
                Ok(url_template) => Some(DownloadConfig::with_url_template(url_template)),
                Err(_) => std::env::var("ZIPDIST_DOWNLOAD")
                    .ok()
                    .filter(|v| v.eq_ignore_ascii_case("true") || v == "1")
                    .map(|_| DownloadConfig::geonames()),
            };
        }

        self
    }

    /// Set the data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the country code. Default is `US`.
    pub fn country(mut self, country: &str) -> Self {
        self.country = normalize_country(country);
        self
    }

    /// Enable downloading the dataset when it is missing locally.
    #[cfg(feature = "download")]
    pub fn auto_download(mut self, config: DownloadConfig) -> Self {
        self.download_config = Some(config);
        self
    }

    /// Whether auto-download is configured.
    #[cfg(feature = "download")]
    pub fn has_auto_download(&self) -> bool {
        self.download_config.is_some()
    }

    /// The configured data directory.
    pub fn get_data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The configured country code.
    pub fn get_country(&self) -> &str {
        &self.country
    }

    /// Path of the uncompressed dataset file (`{data_dir}/{COUNTRY}.txt`).
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.txt", self.country))
    }

    /// Path of the dataset archive (`{data_dir}/{COUNTRY}.zip`).
    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.zip", self.country))
    }

    /// Load the dataset.
    ///
    /// Uses `{COUNTRY}.txt` if present, otherwise extracts it from
    /// `{COUNTRY}.zip`, otherwise downloads it when auto-download is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::DatasetNotFound`] when no source is available, or
    /// an IO, archive, parse, or download error.
    pub fn build(self) -> Result<GeoNamesDataset> {
        let path = self.ensure_dataset_file()?;
        GeoNamesDataset::from_file(&self.country, path)
    }

    /// Make sure `{COUNTRY}.txt` exists locally and return its path.
    fn ensure_dataset_file(&self) -> Result<PathBuf> {
        let path = self.dataset_path();
        if path.exists() {
            return Ok(path);
        }

        let zip_path = self.archive_path();
        if zip_path.exists() {
            let file = File::open(&zip_path)?;
            let contents = extract_country_file(BufReader::new(file), &self.country, &zip_path)?;
            write_atomically(&path, &contents)?;
            return Ok(path);
        }

        #[cfg(feature = "download")]
        if let Some(ref config) = self.download_config {
            let downloader = Downloader::new(config.clone())?;
            return downloader.download_country(&self.country, &self.data_dir);
        }

        Err(ZipError::DatasetNotFound { path })
    }
}
