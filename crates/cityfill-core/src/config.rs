// crates/cityfill-core/src/config.rs
use crate::cache::CacheTtl;
use crate::error::Result;
use crate::gazetteer::GazetteerStore;
use crate::model::EnabledCountrySet;
use crate::suggest::{ResultLimit, DEFAULT_MAX_RESULTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CITYFILL";
pub const DEFAULT_CONFIG_NAME: &str = "cityfill";

pub const DEFAULT_CITY_PRIORITY: i64 = 45;
pub const MAX_CITY_PRIORITY: i64 = 999;

/// Runtime settings for the autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Directory holding the `<CC>.txt` gazetteer files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// ISO2 codes with autocomplete switched on
    #[serde(default)]
    pub enabled_countries: Vec<String>,

    /// Display priority of the city field (clamped to 0..=999)
    #[serde(default = "default_city_priority")]
    pub city_priority: i64,

    /// How long a parsed country stays cached
    #[serde(default)]
    pub cache_ttl: CacheTtl,

    /// Maximum suggestions per query, 0 for no cap
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Persist parsed datasets here instead of only in memory
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            enabled_countries: Vec::new(),
            city_priority: default_city_priority(),
            cache_ttl: CacheTtl::default(),
            max_results: default_max_results(),
            snapshot_dir: None,
        }
    }
}

impl Settings {
    /// Load from an optional TOML file, then `CITYFILL__*` environment
    /// variables on top.
    ///
    /// Without an explicit path, `cityfill.toml` in the working directory is
    /// used if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("enabled_countries"),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.city_priority != settings.city_priority() {
            tracing::warn!(
                configured = settings.city_priority,
                used = settings.city_priority(),
                "city_priority out of range, clamping"
            );
        }
        Ok(settings)
    }

    pub fn enabled_set(&self) -> EnabledCountrySet {
        EnabledCountrySet::from_codes(&self.enabled_countries)
    }

    /// Clamped display priority for the city field.
    pub fn city_priority(&self) -> i64 {
        self.city_priority.clamp(0, MAX_CITY_PRIORITY)
    }

    pub fn result_limit(&self) -> ResultLimit {
        ResultLimit::from_max(self.max_results)
    }

    pub fn store(&self) -> GazetteerStore {
        GazetteerStore::new(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_city_priority() -> i64 {
    DEFAULT_CITY_PRIORITY
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::{const_mutex, Mutex};
    use std::env;
    use std::fs;

    // Environment variables are process-wide; every test that calls `load`
    // holds this.
    static ENV_LOCK: Mutex<()> = const_mutex(());

    /// Sets variables for the duration of a test and restores the previous
    /// values on drop.
    struct EnvVars(Vec<(&'static str, Option<String>)>);

    impl EnvVars {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, value)| {
                    let old = env::var(key).ok();
                    env::set_var(key, value);
                    (*key, old)
                })
                .collect();
            EnvVars(saved)
        }
    }

    impl Drop for EnvVars {
        fn drop(&mut self) {
            for (key, old) in &self.0 {
                match old {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert!(s.enabled_countries.is_empty());
        assert_eq!(s.city_priority(), 45);
        assert_eq!(s.cache_ttl, CacheTtl::Week);
        assert_eq!(s.result_limit(), ResultLimit::Capped(10));
        assert!(s.snapshot_dir.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let _lock = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cityfill.toml");
        fs::write(
            &path,
            r#"
data_dir = "/srv/gazetteer"
enabled_countries = ["bg", "RO"]
city_priority = 5000
cache_ttl = "day"
max_results = 0
"#,
        )
        .unwrap();

        let s = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(s.data_dir, PathBuf::from("/srv/gazetteer"));
        assert_eq!(s.city_priority(), 999);
        assert_eq!(s.cache_ttl, CacheTtl::Day);
        assert_eq!(s.result_limit(), ResultLimit::Unbounded);

        let enabled = s.enabled_set();
        assert!(enabled.contains_code("BG"));
        assert!(enabled.contains_code("RO"));
    }

    #[test]
    fn test_negative_priority_clamps_to_zero() {
        let s = Settings {
            city_priority: -3,
            ..Settings::default()
        };
        assert_eq!(s.city_priority(), 0);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let _lock = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn test_unknown_ttl_is_rejected() {
        let _lock = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "cache_ttl = \"fortnight\"\n").unwrap();
        assert!(Settings::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cityfill.toml");
        fs::write(
            &path,
            "enabled_countries = [\"FR\"]\ncache_ttl = \"day\"\nmax_results = 25\ncity_priority = 7\n",
        )
        .unwrap();

        let _env = EnvVars::set(&[
            ("CITYFILL__ENABLED_COUNTRIES", "bg,RO"),
            ("CITYFILL__MAX_RESULTS", "0"),
            ("CITYFILL__CACHE_TTL", "hour"),
        ]);
        let s = Settings::load(Some(path.as_path())).unwrap();

        assert_eq!(s.enabled_countries, vec!["bg".to_string(), "RO".to_string()]);
        let enabled = s.enabled_set();
        assert!(enabled.contains_code("BG") && enabled.contains_code("RO"));
        assert!(!enabled.contains_code("FR"));
        assert_eq!(s.result_limit(), ResultLimit::Unbounded);
        assert_eq!(s.cache_ttl, CacheTtl::Hour);
        // Keys without a variable keep the file's value.
        assert_eq!(s.city_priority(), 7);
    }
}
