// crates/cityfill-core/src/suggest.rs

//! # Suggestion Engine
//!
//! `(term, country)` in, matching [`PlaceRecord`]s out, in file order.
//!
//! Short terms, unknown or disabled countries and countries without a
//! gazetteer file all answer with an empty list. The only error is a
//! gazetteer file that exists but cannot be read.

use crate::cache::{CacheTtl, DatasetCache, MemoryCache};
use crate::common::ParseStats;
use crate::config::Settings;
use crate::error::Result;
use crate::gazetteer::GazetteerStore;
use crate::model::{CountryCode, CountryDataset, EnabledCountrySet, PlaceRecord};
use crate::text::normalize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Terms shorter than this (in characters) never produce results.
pub const MIN_TERM_CHARS: usize = 2;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// How many matches a query may return.
///
/// Capping keeps the first N matches in file order; there is no sampling
/// or re-ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultLimit {
    Capped(usize),
    Unbounded,
}

impl ResultLimit {
    /// `0` means unbounded.
    pub fn from_max(max: usize) -> Self {
        if max == 0 {
            ResultLimit::Unbounded
        } else {
            ResultLimit::Capped(max)
        }
    }

    fn take(self) -> usize {
        match self {
            ResultLimit::Capped(n) => n,
            ResultLimit::Unbounded => usize::MAX,
        }
    }
}

impl Default for ResultLimit {
    fn default() -> Self {
        ResultLimit::Capped(DEFAULT_MAX_RESULTS)
    }
}

/// The suggestion pipeline: guards, cached dataset lookup, folded match.
///
/// The cache is shared through an `Arc`, so several engines (or threads
/// holding clones of one) see the same entries.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    store: GazetteerStore,
    cache: Arc<dyn DatasetCache>,
    enabled: EnabledCountrySet,
    ttl: Duration,
    limit: ResultLimit,
}

impl SuggestionEngine {
    pub fn new(store: GazetteerStore, cache: Arc<dyn DatasetCache>, enabled: EnabledCountrySet) -> Self {
        SuggestionEngine {
            store,
            cache,
            enabled,
            ttl: CacheTtl::default().as_duration(),
            limit: ResultLimit::default(),
        }
    }

    /// Engine over `store` with a fresh in-memory cache.
    pub fn in_memory(store: GazetteerStore, enabled: EnabledCountrySet) -> Self {
        Self::new(store, Arc::new(MemoryCache::new()), enabled)
    }

    /// Build from [`Settings`]. Uses the persistent snapshot cache when a
    /// snapshot directory is configured, the in-memory cache otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        let cache: Arc<dyn DatasetCache> = match settings.snapshot_dir.as_ref() {
            #[cfg(feature = "snapshot")]
            Some(dir) => Arc::new(crate::cache::SnapshotCache::new(dir)),
            #[cfg(not(feature = "snapshot"))]
            Some(dir) => {
                warn!(dir = %dir.display(), "snapshot support not compiled in, using memory cache");
                Arc::new(MemoryCache::new())
            }
            None => Arc::new(MemoryCache::new()),
        };
        Self::new(settings.store(), cache, settings.enabled_set())
            .with_ttl(settings.cache_ttl)
            .with_limit(settings.result_limit())
    }

    pub fn with_ttl(mut self, ttl: impl Into<Duration>) -> Self {
        self.ttl = ttl.into();
        self
    }

    pub fn with_limit(mut self, limit: ResultLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn store(&self) -> &GazetteerStore {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn DatasetCache> {
        &self.cache
    }

    pub fn enabled(&self) -> &EnabledCountrySet {
        &self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn limit(&self) -> ResultLimit {
        self.limit
    }

    pub fn is_enabled(&self, country: &str) -> bool {
        self.enabled.contains_code(country)
    }

    /// Resolve a country's dataset through the cache, parsing and storing it
    /// on a miss. `None` when the country has no gazetteer file.
    pub fn dataset(&self, code: &CountryCode) -> Result<Option<Arc<CountryDataset>>> {
        if let Some(ds) = self.cache.get(code) {
            trace!(country = %code, "cache hit");
            return Ok(Some(ds));
        }
        if self.store.locate(code).is_none() {
            debug!(country = %code, "no gazetteer data");
            return Ok(None);
        }

        debug!(country = %code, "cache miss, parsing gazetteer");
        let ds = Arc::new(self.store.load_dataset(code)?);
        if let Err(e) = self.cache.put(code, Arc::clone(&ds), self.ttl) {
            // Serving from the fresh parse is still correct; only the cache is lost.
            warn!(country = %code, error = %e, "could not store dataset in cache");
        }
        Ok(Some(ds))
    }

    /// Places in `country` whose folded name contains the folded `term`.
    ///
    /// ```rust,no_run
    /// use cityfill_core::prelude::*;
    ///
    /// let engine = SuggestionEngine::in_memory(
    ///     GazetteerStore::new(GazetteerStore::default_data_dir()),
    ///     EnabledCountrySet::from_codes(["BG"]),
    /// );
    /// for place in engine.suggest("sof", "BG")? {
    ///     println!("{} [{}]", place.city, place.postal_code);
    /// }
    /// # Ok::<(), cityfill_core::CityFillError>(())
    /// ```
    pub fn suggest(&self, term: &str, country: &str) -> Result<Vec<PlaceRecord>> {
        let term = term.trim();
        if term.chars().count() < MIN_TERM_CHARS {
            return Ok(Vec::new());
        }
        let Some(code) = CountryCode::parse(country) else {
            return Ok(Vec::new());
        };
        if !self.enabled.contains(&code) {
            trace!(country = %code, "country not enabled");
            return Ok(Vec::new());
        }
        let Some(dataset) = self.dataset(&code)? else {
            return Ok(Vec::new());
        };

        let folded = normalize(term);
        let hits: Vec<PlaceRecord> = dataset
            .matching(&folded)
            .take(self.limit.take())
            .cloned()
            .collect();
        debug!(country = %code, hits = hits.len(), "suggest");
        Ok(hits)
    }

    /// Warm the cache for every enabled country that ships a file.
    pub fn warm_enabled(&self) -> Result<Vec<(CountryCode, ParseStats)>> {
        let mut out = Vec::new();
        for code in self.enabled.iter() {
            if let Some(stats) = self.cache.warm(&self.store, code, self.ttl)? {
                out.push((code.clone(), stats));
            }
        }
        Ok(out)
    }

    /// Drop the cached datasets of every enabled country.
    pub fn invalidate_enabled(&self) -> Result<()> {
        let codes: Vec<CountryCode> = self.enabled.iter().cloned().collect();
        self.cache.invalidate_all(&codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use proptest::prelude::*;
    use std::fs;

    const BG_ROWS: &str = "BG\t1000\tSofia\tSofia-Grad\t22\n\
                           BG\t4000\tPlovdiv\tPlovdiv\t16\n\
                           BG\t9000\tVarna / Варна\tVarna\t03\n\
                           BG\t1000\tSofia\tSofia-Grad\t22\n";

    fn engine_with(files: &[(&str, &str)], enabled: &[&str]) -> (tempfile::TempDir, SuggestionEngine) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let engine = SuggestionEngine::in_memory(
            GazetteerStore::new(dir.path()),
            EnabledCountrySet::from_codes(enabled),
        );
        (dir, engine)
    }

    fn cities(records: &[PlaceRecord]) -> Vec<&str> {
        records.iter().map(|r| r.city.as_str()).collect()
    }

    #[test]
    fn substring_match_not_just_prefix() {
        let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
        let hits = engine.suggest("ovdi", "BG").unwrap();
        assert_eq!(cities(&hits), vec!["Plovdiv"]);
        assert_eq!(hits[0].region_code(), Some("16"));
    }

    #[test]
    fn duplicates_are_kept_in_file_order() {
        let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
        let hits = engine.suggest("sofia", "bg").unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn composite_name_is_returned_whole() {
        let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
        let hits = engine.suggest("варна", "BG").unwrap();
        assert_eq!(cities(&hits), vec!["Varna / Варна"]);
    }

    #[test]
    fn cap_keeps_first_n_in_file_order() {
        let rows: String = (0..25).map(|i| format!("BG\t{i:04}\tSelo {i}\n")).collect();
        let (_d, engine) = engine_with(&[("BG.txt", rows.as_str())], &["BG"]);

        let capped = engine.suggest("selo", "BG").unwrap();
        assert_eq!(capped.len(), DEFAULT_MAX_RESULTS);
        assert_eq!(capped[0].postal_code, "0000");
        assert_eq!(capped[9].postal_code, "0009");

        let engine = engine.with_limit(ResultLimit::Unbounded);
        assert_eq!(engine.suggest("selo", "BG").unwrap().len(), 25);
    }

    #[test]
    fn whitespace_padding_does_not_satisfy_length_guard() {
        let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
        assert!(engine.suggest(" s ", "BG").unwrap().is_empty());
    }

    #[test]
    fn missing_file_for_enabled_country_is_empty_and_uncached() {
        let (dir, engine) = engine_with(&[], &["BG"]);
        assert!(engine.suggest("sof", "BG").unwrap().is_empty());

        // A file deployed later is picked up on the next query.
        fs::write(dir.path().join("BG.txt"), BG_ROWS).unwrap();
        assert_eq!(engine.suggest("sof", "BG").unwrap().len(), 2);
    }

    #[test]
    fn second_query_is_served_from_cache() {
        let (dir, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 1);

        // Changing the file does not matter until the entry expires.
        fs::write(dir.path().join("BG.txt"), "BG\t4000\tPlovdiv\nBG\t4001\tPlovdiv\n").unwrap();
        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 1);

        engine.invalidate_enabled().unwrap();
        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 2);
    }

    #[test]
    fn expired_entry_is_reparsed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BG.txt"), BG_ROWS).unwrap();
        let clock = Arc::new(ManualClock::default());
        let engine = SuggestionEngine::new(
            GazetteerStore::new(dir.path()),
            Arc::new(MemoryCache::with_clock(clock.clone())),
            EnabledCountrySet::from_codes(["BG"]),
        )
        .with_ttl(CacheTtl::Hour);

        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 1);
        fs::write(dir.path().join("BG.txt"), "BG\t4000\tPlovdiv\nBG\t4001\tPlovdiv\n").unwrap();

        clock.advance(Duration::from_secs(59 * 60));
        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 1);

        clock.advance(Duration::from_secs(60));
        assert_eq!(engine.suggest("plov", "BG").unwrap().len(), 2);
    }

    #[test]
    fn warm_enabled_skips_countries_without_files() {
        let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG", "FR"]);
        let warmed = engine.warm_enabled().unwrap();
        assert_eq!(warmed.len(), 1);
        assert_eq!(warmed[0].0.as_str(), "BG");
        assert_eq!(warmed[0].1.records, 4);
        assert!(engine.cache().get(&warmed[0].0).is_some());
    }

    #[test]
    fn unreadable_file_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("BG.txt")).unwrap();
        let engine = SuggestionEngine::in_memory(
            GazetteerStore::new(dir.path()),
            EnabledCountrySet::from_codes(["BG"]),
        );
        assert!(engine.suggest("sof", "BG").is_err());
        // The guards still win before any I/O happens.
        assert!(engine.suggest("s", "BG").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn short_terms_never_match(term in "\\PC{0,1}", country in "[A-Z]{2}") {
            let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS)], &["BG"]);
            prop_assert!(engine.suggest(&term, &country).unwrap().is_empty());
        }

        #[test]
        fn disabled_countries_never_match(term in "[a-z]{2,8}") {
            let (_d, engine) = engine_with(&[("BG.txt", BG_ROWS), ("RO.txt", "RO\t500001\tBrașov\n")], &["BG"]);
            prop_assert!(engine.suggest(&term, "RO").unwrap().is_empty());
            prop_assert!(engine.suggest(&term, "FR").unwrap().is_empty());
        }
    }
}
