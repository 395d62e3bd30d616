// crates/cityfill-core/src/gazetteer.rs

//! # Gazetteer Store
//!
//! Handles the physical layer: one tab-separated `<CC>.txt` file per country
//! (GeoNames postal-code layout), read line by line.
//!
//! Field layout: `[0]` country code, `[1]` postal code, `[2]` place name,
//! `[3]` admin name 1, `[4]` admin code 1, ... Only the first three are
//! required; `[4]` becomes the record's region code when present.

use crate::common::ParseStats;
use crate::error::{CityFillError, Result};
use crate::model::{CountryCode, CountryDataset, PlaceRecord};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DATA_FILE_EXTENSION: &str = "txt";

const FIELD_POSTAL: usize = 1;
const FIELD_CITY: usize = 2;
const FIELD_REGION: usize = 4;
const MIN_FIELDS: usize = 3;

/// Read-only view over a directory of per-country gazetteer files.
#[derive(Debug, Clone)]
pub struct GazetteerStore {
    data_dir: PathBuf,
}

impl GazetteerStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        GazetteerStore {
            data_dir: data_dir.into(),
        }
    }

    /// The sample dataset shipped with this crate.
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, code: &CountryCode) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", code.as_str(), DATA_FILE_EXTENSION))
    }

    /// The file backing `code`, if any. `BG.txt` wins over `bg.txt`.
    pub fn locate(&self, code: &CountryCode) -> Option<PathBuf> {
        let upper = self.path_for(code);
        if upper.exists() {
            return Some(upper);
        }
        let lower = self.data_dir.join(format!(
            "{}.{}",
            code.as_str().to_ascii_lowercase(),
            DATA_FILE_EXTENSION
        ));
        lower.exists().then_some(lower)
    }

    pub fn has_country(&self, code: &CountryCode) -> bool {
        self.locate(code).is_some_and(|p| p.is_file())
    }

    /// Country codes of every `*.txt` file in the data directory, sorted.
    ///
    /// A missing directory yields an empty list.
    pub fn available_countries(&self) -> Result<Vec<CountryCode>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CityFillError::file_access(&self.data_dir, e)),
        };

        let mut codes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_data = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION));
            if !is_data || !path.is_file() {
                continue;
            }
            if let Some(code) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(CountryCode::parse)
            {
                codes.push(code);
            }
        }
        codes.sort();
        codes.dedup();
        Ok(codes)
    }

    /// Parse the country's file into records, in file order.
    ///
    /// A missing file is not an error: it yields an empty list. Malformed
    /// rows are skipped. Only a file that exists but cannot be read fails.
    pub fn parse(&self, code: &CountryCode) -> Result<Vec<PlaceRecord>> {
        self.parse_with_stats(code).map(|(records, _)| records)
    }

    pub fn parse_with_stats(&self, code: &CountryCode) -> Result<(Vec<PlaceRecord>, ParseStats)> {
        let Some(path) = self.locate(code) else {
            debug!(country = %code, dir = %self.data_dir.display(), "no gazetteer file");
            return Ok((Vec::new(), ParseStats::default()));
        };
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!(country = %code, path = %path.display(), error = %e, "gazetteer file not readable");
                return Err(CityFillError::file_access(path, e));
            }
        };

        let (records, stats) = parse_reader(BufReader::new(file)).map_err(|e| {
            warn!(country = %code, path = %path.display(), error = %e, "gazetteer read failed");
            CityFillError::file_access(&path, e)
        })?;

        debug!(
            country = %code,
            lines = stats.lines,
            records = stats.records,
            skipped = stats.skipped,
            "parsed gazetteer"
        );
        Ok((records, stats))
    }

    pub fn load_dataset(&self, code: &CountryCode) -> Result<CountryDataset> {
        let records = self.parse(code)?;
        Ok(CountryDataset::new(code.clone(), records))
    }
}

/// Parse gazetteer rows from any buffered reader.
///
/// Lines are read one at a time; rows that are not valid UTF-8, have fewer
/// than three fields, or have an empty place name or postal code are
/// counted as skipped.
pub fn parse_reader<R: BufRead>(mut reader: R) -> io::Result<(Vec<PlaceRecord>, ParseStats)> {
    let mut records = Vec::new();
    let mut stats = ParseStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        let parsed = std::str::from_utf8(&buf).ok().and_then(parse_line);
        match parsed {
            Some(record) => records.push(record),
            None => stats.skipped += 1,
        }
    }

    stats.records = records.len();
    Ok((records, stats))
}

/// Parse a single tab-separated row. `None` for malformed rows.
///
/// ```rust
/// use cityfill_core::gazetteer::parse_line;
///
/// let r = parse_line("BG\t1000\tSofia\tSofia-Grad\t22\n").unwrap();
/// assert_eq!(r.city, "Sofia");
/// assert_eq!(r.postal_code, "1000");
/// assert_eq!(r.region_code.as_deref(), Some("22"));
///
/// assert!(parse_line("BG\t1000").is_none());
/// ```
pub fn parse_line(line: &str) -> Option<PlaceRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let postal_code = parts[FIELD_POSTAL];
    let city = parts[FIELD_CITY].trim();
    if city.is_empty() || postal_code.is_empty() {
        return None;
    }

    let region_code = parts
        .get(FIELD_REGION)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(PlaceRecord {
        city: city.to_string(),
        postal_code: postal_code.to_string(),
        region_code,
    })
}
