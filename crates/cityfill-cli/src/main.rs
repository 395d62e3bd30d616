//! cityfill: command-line front end for cityfill-core
//!
//! Usage examples
//! --------------
//!
//! - Suggest cities for a term
//!   $ cityfill -e BG suggest sof --country BG
//!
//! - Pre-parse every enabled country into the cache
//!   $ cityfill warm
//!
//! - Drop cached datasets after replacing gazetteer files
//!   $ cityfill invalidate
//!
//! - List the countries that have a data file
//!   $ cityfill countries
//!
//! Data source
//! -----------
//!
//! By default the sample gazetteer bundled with `cityfill-core` is used.
//! Point `--data-dir` (or `data_dir` in the settings) at a directory of
//! GeoNames postal dumps to use real data. Without a `snapshot_dir` the
//! cache lives only as long as the process, so `warm` is mostly useful
//! together with it.
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::Context;
use cityfill_core::checkout::clean_composite;
use cityfill_core::prelude::*;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "cityfill_core=warn,warn",
        1 => "cityfill_core=debug,info",
        _ => "cityfill_core=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    // Fall back to the bundled sample data when nothing points elsewhere
    settings.data_dir = match args.data_dir {
        Some(dir) => dir,
        None if settings.data_dir.exists() => settings.data_dir,
        None => GazetteerStore::default_data_dir(),
    };
    if let Some(codes) = args.enable {
        settings.enabled_countries = codes;
    }

    let engine = SuggestionEngine::from_settings(&settings);

    match args.command {
        Commands::Suggest { term, country } => {
            if !engine.is_enabled(&country) {
                info!(%country, "country not enabled, answer will be empty");
            }
            let hits = query::handle(&engine, &SuggestRequest::new(term, country))?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }

        Commands::Warm { country, all } => {
            let warmed = match country {
                None if all => engine.cache().warm_all(engine.store(), engine.ttl())?,
                Some(raw) => {
                    let code: CountryCode = raw.parse()?;
                    engine
                        .cache()
                        .warm(engine.store(), &code, engine.ttl())?
                        .map(|stats| vec![(code, stats)])
                        .unwrap_or_default()
                }
                None => engine.warm_enabled()?,
            };
            if warmed.is_empty() {
                eprintln!("Nothing to warm (no enabled country has a data file)");
            }
            for (code, stats) in warmed {
                println!(
                    "{code}: {} records ({} lines, {} skipped)",
                    stats.records, stats.lines, stats.skipped
                );
            }
        }

        Commands::Invalidate => {
            engine.invalidate_enabled()?;
            println!("Invalidated {} countries", engine.enabled().len());
        }

        Commands::Countries => {
            let available = engine.store().available_countries()?;
            if available.is_empty() {
                println!("No gazetteer files in {}", engine.store().data_dir().display());
            }
            for code in available {
                let mark = if engine.enabled().contains(&code) { " (enabled)" } else { "" };
                println!("{code}{mark}");
            }
        }

        Commands::Clean { name } => {
            println!("{}", clean_composite(&name));
        }
    }

    Ok(())
}
