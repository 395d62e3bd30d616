// crates/cityfill-core/src/cache.rs

//! # Cache Layer
//!
//! Keeps parsed [`CountryDataset`]s out of the per-keystroke path. One entry
//! per country code, expired by a single process-wide TTL, no capacity bound.
//!
//! Population on a miss is not serialized: two concurrent misses for the
//! same country both parse and both `put`, and the last write wins. Parsing
//! is pure, so the only cost is duplicated work.

use crate::common::ParseStats;
use crate::error::Result;
use crate::gazetteer::GazetteerStore;
use crate::model::{CountryCode, CountryDataset};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

#[cfg(feature = "snapshot")]
mod snapshot;
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotCache;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

// -----------------------------------------------------------------------------
// TTL
// -----------------------------------------------------------------------------

/// The recognised cache lifetimes. Defaults to one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTtl {
    Hour,
    Day,
    #[default]
    Week,
    /// Thirty days.
    Month,
}

impl CacheTtl {
    pub const ALL: [CacheTtl; 4] = [CacheTtl::Hour, CacheTtl::Day, CacheTtl::Week, CacheTtl::Month];

    pub fn as_duration(self) -> Duration {
        let secs = match self {
            CacheTtl::Hour => HOUR,
            CacheTtl::Day => DAY,
            CacheTtl::Week => 7 * DAY,
            CacheTtl::Month => 30 * DAY,
        };
        Duration::from_secs(secs)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CacheTtl::Hour => "hour",
            CacheTtl::Day => "day",
            CacheTtl::Week => "week",
            CacheTtl::Month => "month",
        }
    }
}

impl fmt::Display for CacheTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheTtl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "1h" => Ok(CacheTtl::Hour),
            "day" | "1d" => Ok(CacheTtl::Day),
            "week" | "1w" => Ok(CacheTtl::Week),
            "month" | "30d" => Ok(CacheTtl::Month),
            other => Err(format!(
                "unknown cache ttl {other:?} (expected hour, day, week or month)"
            )),
        }
    }
}

impl From<CacheTtl> for Duration {
    fn from(ttl: CacheTtl) -> Self {
        ttl.as_duration()
    }
}

// -----------------------------------------------------------------------------
// CLOCK
// -----------------------------------------------------------------------------

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to. Handy for exercising expiry.
#[derive(Debug)]
pub struct ManualClock(Mutex<SystemTime>);

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        ManualClock(Mutex::new(start))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new(SystemTime::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock()
    }
}

/// `None` means the deadline is past what `SystemTime` can represent.
pub(crate) fn deadline(now: SystemTime, ttl: Duration) -> Option<SystemTime> {
    now.checked_add(ttl)
}

// -----------------------------------------------------------------------------
// CACHE TRAIT
// -----------------------------------------------------------------------------

/// Keyed, TTL-bound store of parsed country datasets.
///
/// Implementations must make an expired entry indistinguishable from a
/// missing one. Storage failures inside `get` are reported as misses.
pub trait DatasetCache: Send + Sync + fmt::Debug {
    /// The cached dataset, if present and not expired.
    fn get(&self, code: &CountryCode) -> Option<Arc<CountryDataset>>;

    /// Store or overwrite the entry for `code`, expiring `ttl` from now.
    fn put(&self, code: &CountryCode, dataset: Arc<CountryDataset>, ttl: Duration) -> Result<()>;

    /// Remove the entry so the next `get` misses.
    fn invalidate(&self, code: &CountryCode) -> Result<()>;

    fn invalidate_all(&self, codes: &[CountryCode]) -> Result<()> {
        for code in codes {
            self.invalidate(code)?;
        }
        info!(countries = codes.len(), "invalidated cached datasets");
        Ok(())
    }

    /// Parse `code` from `store` and populate the cache eagerly.
    ///
    /// Returns `None` without touching the cache when the country has no
    /// gazetteer file.
    fn warm(
        &self,
        store: &GazetteerStore,
        code: &CountryCode,
        ttl: Duration,
    ) -> Result<Option<ParseStats>> {
        if store.locate(code).is_none() {
            debug!(country = %code, "nothing to warm");
            return Ok(None);
        }
        let (records, stats) = store.parse_with_stats(code)?;
        self.put(code, Arc::new(CountryDataset::new(code.clone(), records)), ttl)?;
        info!(country = %code, records = stats.records, skipped = stats.skipped, "warmed cache");
        Ok(Some(stats))
    }

    /// Warm every country shipped in `store`, one after another.
    fn warm_all(
        &self,
        store: &GazetteerStore,
        ttl: Duration,
    ) -> Result<Vec<(CountryCode, ParseStats)>> {
        let mut out = Vec::new();
        for code in store.available_countries()? {
            if let Some(stats) = self.warm(store, &code, ttl)? {
                out.push((code, stats));
            }
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// IN-MEMORY BACKEND
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Entry {
    dataset: Arc<CountryDataset>,
    expires_at: Option<SystemTime>,
}

impl Entry {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Process-local cache backed by a map behind a read/write lock.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CountryCode, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        MemoryCache {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache for MemoryCache {
    fn get(&self, code: &CountryCode) -> Option<Arc<CountryDataset>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(code) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(Arc::clone(&entry.dataset)),
                Some(_) => {}
            }
        }
        // Expired: drop it unless someone refreshed it in between.
        let mut entries = self.entries.write();
        if entries.get(code).is_some_and(|e| !e.is_live(now)) {
            entries.remove(code);
            debug!(country = %code, "cache entry expired");
        }
        None
    }

    fn put(&self, code: &CountryCode, dataset: Arc<CountryDataset>, ttl: Duration) -> Result<()> {
        let expires_at = deadline(self.clock.now(), ttl);
        self.entries.write().insert(
            code.clone(),
            Entry {
                dataset,
                expires_at,
            },
        );
        Ok(())
    }

    fn invalidate(&self, code: &CountryCode) -> Result<()> {
        if self.entries.write().remove(code).is_some() {
            debug!(country = %code, "cache entry invalidated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaceRecord;
    use std::fs;

    fn bg() -> CountryCode {
        CountryCode::parse("BG").unwrap()
    }

    fn dataset() -> Arc<CountryDataset> {
        Arc::new(CountryDataset::new(bg(), vec![PlaceRecord::new("Sofia", "1000")]))
    }

    fn cache_with_clock() -> (Arc<ManualClock>, MemoryCache) {
        let clock = Arc::new(ManualClock::default());
        let cache = MemoryCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn get_before_ttl_returns_dataset_after_ttl_misses() {
        let (clock, cache) = cache_with_clock();
        let ds = dataset();
        cache.put(&bg(), ds.clone(), Duration::from_secs(60)).unwrap();

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&bg()).as_deref(), Some(ds.as_ref()));

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&bg()).is_none());
        assert!(cache.is_empty(), "expired entry should be dropped on read");
    }

    #[test]
    fn put_overwrites_and_resets_expiry() {
        let (clock, cache) = cache_with_clock();
        cache.put(&bg(), dataset(), Duration::from_secs(10)).unwrap();
        clock.advance(Duration::from_secs(8));

        let fresh = Arc::new(CountryDataset::empty(bg()));
        cache.put(&bg(), fresh.clone(), Duration::from_secs(10)).unwrap();
        clock.advance(Duration::from_secs(8));

        let got = cache.get(&bg()).unwrap();
        assert!(Arc::ptr_eq(&got, &fresh));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_miss() {
        let cache = MemoryCache::new();
        cache.put(&bg(), dataset(), CacheTtl::Week.into()).unwrap();
        cache.invalidate(&bg()).unwrap();
        assert!(cache.get(&bg()).is_none());
        // Invalidating an absent key is fine.
        cache.invalidate(&bg()).unwrap();
    }

    #[test]
    fn zero_ttl_is_immediately_stale() {
        let cache = MemoryCache::new();
        cache.put(&bg(), dataset(), Duration::ZERO).unwrap();
        assert!(cache.get(&bg()).is_none());
    }

    #[test]
    fn huge_ttl_never_expires() {
        let (clock, cache) = cache_with_clock();
        cache.put(&bg(), dataset(), Duration::MAX).unwrap();
        clock.advance(Duration::from_secs(100 * 365 * DAY));
        assert!(cache.get(&bg()).is_some());
    }

    #[test]
    fn purge_expired_only_drops_stale_entries() {
        let (clock, cache) = cache_with_clock();
        let ro = CountryCode::parse("RO").unwrap();
        cache.put(&bg(), dataset(), Duration::from_secs(5)).unwrap();
        cache
            .put(&ro, Arc::new(CountryDataset::empty(ro.clone())), Duration::from_secs(50))
            .unwrap();
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.get(&ro).is_some());
    }

    #[test]
    fn warm_populates_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BG.txt"), "BG\t1000\tSofia\nBG\t4000\n").unwrap();
        let store = GazetteerStore::new(dir.path());
        let cache = MemoryCache::new();

        let stats = cache.warm(&store, &bg(), CacheTtl::Day.into()).unwrap().unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(cache.get(&bg()).unwrap().len(), 1);

        let fr = CountryCode::parse("FR").unwrap();
        assert!(cache.warm(&store, &fr, CacheTtl::Day.into()).unwrap().is_none());
        assert!(cache.get(&fr).is_none());
    }

    #[test]
    fn warm_all_walks_every_shipped_country() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BG.txt"), "BG\t1000\tSofia\n").unwrap();
        fs::write(dir.path().join("RO.txt"), "RO\t500001\tBrașov\n").unwrap();
        let store = GazetteerStore::new(dir.path());
        let cache = MemoryCache::new();

        let warmed = cache.warm_all(&store, CacheTtl::Hour.into()).unwrap();
        let codes: Vec<&str> = warmed.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, vec!["BG", "RO"]);
        assert_eq!(cache.len(), 2);

        let all: Vec<CountryCode> = warmed.into_iter().map(|(c, _)| c).collect();
        cache.invalidate_all(&all).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn ttl_options_parse_and_default_to_week() {
        assert_eq!(CacheTtl::default(), CacheTtl::Week);
        assert_eq!("DAY".parse::<CacheTtl>().unwrap(), CacheTtl::Day);
        assert_eq!("30d".parse::<CacheTtl>().unwrap(), CacheTtl::Month);
        assert!("fortnight".parse::<CacheTtl>().is_err());
        assert_eq!(CacheTtl::Month.as_duration(), Duration::from_secs(30 * DAY));
        let ttl: CacheTtl = serde_json::from_str("\"hour\"").unwrap();
        assert_eq!(ttl, CacheTtl::Hour);
    }
}
