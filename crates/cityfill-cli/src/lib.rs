//! cityfill-cli
//! ============
//!
//! Command-line interface for the `cityfill-core` city autocomplete engine.
//!
//! This crate primarily provides a binary (`cityfill`). We include a small
//! library target so that docs.rs renders a documentation page and shows this
//! overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! cargo install cityfill-cli
//! cityfill --help
//! cityfill countries
//! cityfill -e BG suggest sof --country BG
//! cityfill -e BG,RO warm
//! ```
//!
//! Settings come from `cityfill.toml` (or `--config <file>`) and
//! `CITYFILL__*` environment variables; see `cityfill_core::config`.
//!
//! Links
//! -----
//! - Core crate: <https://docs.rs/cityfill-core>
//!
#![cfg_attr(docsrs, feature(doc_cfg))]

// This library target intentionally exposes no API; the binary is the primary
// deliverable.
