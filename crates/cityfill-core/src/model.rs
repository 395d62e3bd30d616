// crates/cityfill-core/src/model.rs
use crate::error::{CityFillError, Result};
use crate::text::{normalize, NameMatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// ISO-3166-1 alpha-2 country code, always stored upper-case.
///
/// Only two ASCII letters are accepted, which also makes the code safe to
/// use as a file stem inside the gazetteer directory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Lenient parse: trims and upper-cases, `None` if the shape is wrong.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
            Some(CountryCode(code.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = CityFillError;

    fn from_str(s: &str) -> Result<Self> {
        CountryCode::parse(s).ok_or_else(|| CityFillError::InvalidCountryCode(s.to_string()))
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CityFillError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CountryCode> for String {
    fn from(c: CountryCode) -> Self {
        c.0
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One gazetteer row: a place name with its postal code.
///
/// Postal codes are not unique in either direction, and `city` may still be
/// a composite `"Primary / Alternate"` label exactly as found in the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub city: String,
    pub postal_code: String,
    pub region_code: Option<String>,
}

impl PlaceRecord {
    pub fn new(city: impl Into<String>, postal_code: impl Into<String>) -> Self {
        PlaceRecord {
            city: city.into(),
            postal_code: postal_code.into(),
            region_code: None,
        }
    }

    pub fn with_region(mut self, region_code: impl Into<String>) -> Self {
        self.region_code = Some(region_code.into());
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn region_code(&self) -> Option<&str> {
        self.region_code.as_deref()
    }
}

impl NameMatch for PlaceRecord {
    fn name_str(&self) -> &str {
        &self.city
    }
}

/// All records of one country, in file order.
///
/// The folded city keys are computed once when the dataset is built, so the
/// per-keystroke scan only folds the search term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDataset {
    country_code: CountryCode,
    records: Vec<PlaceRecord>,
    keys: Vec<String>,
}

impl CountryDataset {
    pub fn new(country_code: CountryCode, records: Vec<PlaceRecord>) -> Self {
        let keys = records.iter().map(|r| normalize(&r.city)).collect();
        CountryDataset {
            country_code,
            records,
            keys,
        }
    }

    pub fn empty(country_code: CountryCode) -> Self {
        Self::new(country_code, Vec::new())
    }

    pub fn country_code(&self) -> &CountryCode {
        &self.country_code
    }

    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose folded city contains `folded_term`, in file order.
    ///
    /// `folded_term` must already be the output of [`normalize`].
    pub fn matching<'a>(&'a self, folded_term: &'a str) -> impl Iterator<Item = &'a PlaceRecord> {
        self.records
            .iter()
            .zip(&self.keys)
            .filter(move |(_, key)| key.contains(folded_term))
            .map(|(record, _)| record)
    }
}

/// Countries for which autocomplete is switched on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledCountrySet(BTreeSet<CountryCode>);

impl EnabledCountrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loose strings; entries that are not two-letter codes are
    /// dropped with a warning.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for raw in codes {
            match CountryCode::parse(raw.as_ref()) {
                Some(code) => {
                    set.insert(code);
                }
                None => tracing::warn!(code = raw.as_ref(), "ignoring invalid country code"),
            }
        }
        EnabledCountrySet(set)
    }

    pub fn insert(&mut self, code: CountryCode) -> bool {
        self.0.insert(code)
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.0.contains(code)
    }

    /// Lenient lookup by raw string (`"bg"` matches `BG`).
    pub fn contains_code(&self, raw: &str) -> bool {
        CountryCode::parse(raw).is_some_and(|c| self.0.contains(&c))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryCode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CountryCode> for EnabledCountrySet {
    fn from_iter<T: IntoIterator<Item = CountryCode>>(iter: T) -> Self {
        EnabledCountrySet(iter.into_iter().collect())
    }
}
