// crates/cityfill-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Simple counters collected while parsing one gazetteer file.
///
/// Returned by [`GazetteerStore::parse_with_stats`](crate::gazetteer::GazetteerStore::parse_with_stats)
/// and by the cache warmers, these reflect what was kept after
/// malformed rows were dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
}
