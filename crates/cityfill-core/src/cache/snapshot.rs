// crates/cityfill-core/src/cache/snapshot.rs
#![cfg(feature = "snapshot")]

//! Persistent backend: one bincode snapshot per country, so a parsed
//! dataset outlives the process that built it (CLI runs, restarts).

use super::{deadline, Clock, DatasetCache, SystemClock};
use crate::error::{CityFillError, Result};
use crate::model::{CountryCode, CountryDataset};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

#[cfg(not(feature = "compact"))]
pub const SNAPSHOT_SUFFIX: &str = "bin";
#[cfg(feature = "compact")]
pub const SNAPSHOT_SUFFIX: &str = "bin.gz";

// Refuse to decode anything absurdly large.
const SNAPSHOT_LIMIT: u64 = 256 * 1024 * 1024;

const NEVER: u64 = u64::MAX;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    /// Milliseconds since the Unix epoch, rounded up; `NEVER` for no expiry.
    expires_at_ms: u64,
    dataset: CountryDataset,
}

/// Cache that stores each dataset as `<dir>/<CC>.bin[.gz]`.
///
/// Unreadable, undecodable or expired snapshots are treated as misses.
#[derive(Debug)]
pub struct SnapshotCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        SnapshotCache {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, code: &CountryCode) -> PathBuf {
        self.dir
            .join(format!("{}.{}", code.as_str(), SNAPSHOT_SUFFIX))
    }

    fn now_ms(&self) -> u64 {
        epoch_millis(self.clock.now())
    }

    fn read_snapshot(path: &Path) -> Result<Snapshot> {
        let reader = open_stream(path)?;
        let snap = bincode::DefaultOptions::new()
            .with_limit(SNAPSHOT_LIMIT)
            .deserialize_from(reader)?;
        Ok(snap)
    }
}

impl DatasetCache for SnapshotCache {
    fn get(&self, code: &CountryCode) -> Option<Arc<CountryDataset>> {
        let path = self.path_for(code);
        if !path.exists() {
            return None;
        }
        let snap = match Self::read_snapshot(&path) {
            Ok(snap) => snap,
            Err(e) => {
                warn!(country = %code, path = %path.display(), error = %e, "discarding unreadable snapshot");
                return None;
            }
        };
        if self.now_ms() >= snap.expires_at_ms {
            debug!(country = %code, "snapshot expired");
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(country = %code, path = %path.display(), error = %e, "could not remove expired snapshot")
                }
            }
            return None;
        }
        if snap.dataset.country_code() != code {
            warn!(country = %code, found = %snap.dataset.country_code(), "snapshot belongs to another country");
            return None;
        }
        Some(Arc::new(snap.dataset))
    }

    fn put(&self, code: &CountryCode, dataset: Arc<CountryDataset>, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let expires_at_ms = deadline(self.clock.now(), ttl).map_or(NEVER, epoch_millis_ceil);
        let snap = Snapshot {
            expires_at_ms,
            dataset: Arc::unwrap_or_clone(dataset),
        };

        // One temp file per writer, renamed into place atomically.
        let path = self.path_for(code);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        write_snapshot(tmp.as_file_mut(), &snap)?;
        tmp.persist(&path)
            .map_err(|e| CityFillError::file_access(&path, e.error))?;
        debug!(country = %code, path = %path.display(), "snapshot written");
        Ok(())
    }

    fn invalidate(&self, code: &CountryCode) -> Result<()> {
        match fs::remove_file(self.path_for(code)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn since_epoch(t: SystemTime) -> Duration {
    t.duration_since(UNIX_EPOCH).unwrap_or_default()
}

fn epoch_millis(t: SystemTime) -> u64 {
    u64::try_from(since_epoch(t).as_millis()).unwrap_or(NEVER)
}

/// Deadlines round up, so an entry never expires before its TTL elapsed.
fn epoch_millis_ceil(t: SystemTime) -> u64 {
    let d = since_epoch(t);
    let ms = d.as_millis() + u128::from(d.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(ms).unwrap_or(NEVER)
}

/// Opens a snapshot, buffers it, and unwraps gzip when `compact` is on.
fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| CityFillError::file_access(path, e))?;
    let reader = BufReader::new(file);

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Ok(Box::new(reader))
    }
}

fn write_snapshot(file: &mut File, snap: &Snapshot) -> Result<()> {
    let writer = BufWriter::new(file);

    #[cfg(feature = "compact")]
    {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encode(&mut encoder, snap)?;
        encoder.finish()?.flush()?;
    }

    #[cfg(not(feature = "compact"))]
    {
        let mut writer = writer;
        encode(&mut writer, snap)?;
        writer.flush()?;
    }

    Ok(())
}

fn encode<W: Write>(writer: &mut W, snap: &Snapshot) -> Result<()> {
    bincode::DefaultOptions::new()
        .with_limit(SNAPSHOT_LIMIT)
        .serialize_into(writer, snap)?;
    Ok(())
}
