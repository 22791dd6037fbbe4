use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// ZIP code distance CLI tool
#[derive(Parser)]
#[command(name = "zipdist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the GeoNames {COUNTRY}.txt or {COUNTRY}.zip export
    #[arg(short, long, env = "ZIPDIST_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Country code of the dataset
    #[arg(
        short,
        long,
        env = "ZIPDIST_COUNTRY",
        default_value = zipdist::DEFAULT_COUNTRY,
        global = true
    )]
    country: String,

    /// Download the dataset from GeoNames if it is missing
    #[arg(short, long, global = true)]
    auto_download: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two postal codes
    Distance {
        /// First postal code
        zip1: String,

        /// Second postal code
        zip2: String,

        /// Preferred unit: "miles" (default) or "km"
        #[arg(short, long)]
        units: Option<String>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Resolve a postal code to its coordinates
    Lookup {
        /// Postal code
        zip: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Display statistics about the postal code dataset
    Info,

    /// Download the postal code dataset into the data directory
    Download {
        /// Custom archive URL template ({country} is replaced)
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Distance {
            zip1,
            zip2,
            units,
            json,
        } => commands::distance::run(
            cli.data_dir,
            &cli.country,
            cli.auto_download,
            &zip1,
            &zip2,
            units.as_deref(),
            json,
        ),
        Commands::Lookup { zip, json } => {
            commands::lookup::run(cli.data_dir, &cli.country, cli.auto_download, &zip, json)
        }
        Commands::Info => commands::info::run(cli.data_dir, &cli.country, cli.auto_download),
        Commands::Download { url } => commands::download::run(cli.data_dir, &cli.country, url),
    }
}
