// crates/cityfill-core/src/lib.rs

//! # cityfill-core
//!
//! City autocomplete for checkout forms. Per-country gazetteer files
//! (`<CC>.txt`, tab separated, GeoNames postal layout) are parsed on
//! demand, cached with a TTL, and searched with an accent and case
//! insensitive substring match.
//!
//! ```rust,no_run
//! use cityfill_core::prelude::*;
//!
//! let settings = Settings::load(None)?;
//! let engine = SuggestionEngine::from_settings(&settings);
//!
//! let hits = query::handle(&engine, &SuggestRequest::new("sof", "BG"))?;
//! println!("{}", serde_json::to_string(&hits)?);
//! # Ok::<(), cityfill_core::CityFillError>(())
//! ```

pub mod cache; // Dataset cache backends
pub mod checkout; // Form collaborators
pub mod common;
pub mod config;
pub mod error;
pub mod gazetteer; // Data file access
pub mod model;
pub mod query; // Request/response boundary
pub mod suggest;
pub mod text; // Folding and sanitizing

// Re-exports
pub use crate::error::{CityFillError, Result};

pub use crate::cache::{CacheTtl, DatasetCache, MemoryCache};
#[cfg(feature = "snapshot")]
pub use crate::cache::SnapshotCache;
pub use crate::common::ParseStats;
pub use crate::config::Settings;
pub use crate::gazetteer::GazetteerStore;
pub use crate::model::{CountryCode, CountryDataset, EnabledCountrySet, PlaceRecord};
pub use crate::query::{SuggestRequest, Suggestion};
pub use crate::suggest::{ResultLimit, SuggestionEngine};
pub use crate::text::{normalize, NameMatch};

/// Everything a storefront integration usually needs.
pub mod prelude {
    pub use crate::cache::{CacheTtl, DatasetCache, MemoryCache};
    #[cfg(feature = "snapshot")]
    pub use crate::cache::SnapshotCache;
    pub use crate::checkout::{clean_composite, AddressFields, CheckoutForm, SelectOption};
    pub use crate::config::Settings;
    pub use crate::error::{CityFillError, Result};
    pub use crate::gazetteer::GazetteerStore;
    pub use crate::model::{CountryCode, CountryDataset, EnabledCountrySet, PlaceRecord};
    pub use crate::query::{self, SuggestRequest, Suggestion};
    pub use crate::suggest::{ResultLimit, SuggestionEngine};
    pub use crate::text::{normalize, NameMatch};
}
