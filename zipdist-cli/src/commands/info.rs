use anyhow::Result;
use std::path::PathBuf;

pub fn run(data_dir: Option<PathBuf>, country: &str, auto_download: bool) -> Result<()> {
    let dataset = super::load_dataset(data_dir, country, auto_download)?;
    let stats = dataset.stats();

    println!("Country: {}", stats.country);
    println!();
    println!("Postal codes: {}", stats.postal_codes);

    if stats.without_coordinates > 0 {
        let pct = (stats.without_coordinates as f64 / stats.postal_codes.max(1) as f64) * 100.0;
        println!(
            "Without coordinates: {} ({:.1}%)",
            stats.without_coordinates, pct
        );
    }
    if stats.duplicate_rows > 0 {
        println!("Merged duplicate rows: {}", stats.duplicate_rows);
    }
    if stats.skipped_rows > 0 {
        println!("Skipped rows: {}", stats.skipped_rows);
    }

    Ok(())
}
