use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for cityfill
#[derive(Debug, Parser)]
#[command(
    name = "cityfill",
    version,
    about = "Query and maintain the cityfill gazetteer and its dataset cache"
)]
pub struct CliArgs {
    /// Settings file (TOML). Defaults to ./cityfill.toml when present
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the <CC>.txt gazetteer files (overrides settings)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated ISO2 codes to enable (overrides settings, e.g. BG,RO)
    #[arg(short = 'e', long = "enable", global = true, value_delimiter = ',')]
    pub enable: Option<Vec<String>>,

    /// Increase log output (-v debug, -vv trace). RUST_LOG wins when set
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print suggestions for a term as JSON
    Suggest {
        /// Search term (at least two characters)
        term: String,

        /// ISO2 code of the country to search
        #[arg(short = 'C', long = "country")]
        country: String,
    },

    /// Parse gazetteer files and store them in the cache
    Warm {
        /// Only this country (default: every enabled country)
        #[arg(short = 'C', long = "country", conflicts_with = "all")]
        country: Option<String>,

        /// Every country with a data file, enabled or not
        #[arg(long = "all")]
        all: bool,
    },

    /// Drop cached datasets of the enabled countries
    Invalidate,

    /// List countries that ship a gazetteer file
    Countries,

    /// Show the primary name of a composite "City / Alternate" label
    Clean {
        /// City label as stored in the gazetteer
        name: String,
    },
}
