//! Workspace facade: re-exports `cityfill-core` so the demos can
//! `use cityfill::prelude::*`.
pub use cityfill_core::*;
