//! Error handling example for cityfill
//!
//! Most unhappy paths answer with an empty list; only an unreadable
//! gazetteer file is an error.

use cityfill::prelude::*;
use std::fs;

fn main() -> Result<()> {
    println!("=== cityfill Error Handling Example ===\n");

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("BG.txt"), "BG\t1000\tSofia\nBG\t4000\n\nnot a row\n")?;
    // A directory where a file is expected: exists, but cannot be read.
    fs::create_dir(dir.path().join("RO.txt"))?;

    let engine = SuggestionEngine::in_memory(
        GazetteerStore::new(dir.path()),
        EnabledCountrySet::from_codes(["BG", "RO", "GR"]),
    );

    // Example 1: silent empty answers
    println!("--- Example 1: empty, not errors ---");
    let cases = [
        ("s", "BG", "term too short"),
        ("sofia", "FR", "country not enabled"),
        ("sofia", "Bulgaria", "not an ISO2 code"),
        ("athens", "GR", "enabled, but no data file"),
    ];
    for (term, country, why) in cases {
        let hits = engine.suggest(term, country)?;
        println!("  suggest({term:?}, {country:?}) -> {} hits ({why})", hits.len());
    }
    println!();

    // Example 2: malformed rows are skipped, not fatal
    println!("--- Example 2: best-effort parsing ---");
    let bg = CountryCode::parse("BG").ok_or_else(|| CityFillError::InvalidCountryCode("BG".into()))?;
    let (records, stats) = engine.store().parse_with_stats(&bg)?;
    println!("  {} records, {} skipped of {} lines", records.len(), stats.skipped, stats.lines);
    println!();

    // Example 3: the one real failure
    println!("--- Example 3: unreadable file ---");
    match engine.suggest("bras", "RO") {
        Ok(hits) => println!("  unexpected success: {} hits", hits.len()),
        Err(e @ CityFillError::FileAccess { .. }) => println!("  ✗ {e}"),
        Err(e) => return Err(e),
    }
    println!();

    // Example 4: strict code parsing when you want it
    println!("--- Example 4: strict country codes ---");
    for raw in ["bg", " ro ", "BGR", "1A"] {
        match raw.parse::<CountryCode>() {
            Ok(code) => println!("  {raw:?} -> {code}"),
            Err(e) => println!("  {raw:?} -> {e}"),
        }
    }

    Ok(())
}
