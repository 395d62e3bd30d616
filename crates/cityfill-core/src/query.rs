// crates/cityfill-core/src/query.rs

//! # Query Boundary
//!
//! The request/response shapes a storefront front end talks to. Requests
//! are untrusted: the term is sanitized here before the engine sees it.
//! The handler is read-only and safe to retry.

use crate::error::Result;
use crate::model::PlaceRecord;
use crate::suggest::SuggestionEngine;
use crate::text::sanitize_term;
use serde::{Deserialize, Serialize};

/// `?term=...&country=...` as sent by the autocomplete widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub country: String,
}

impl SuggestRequest {
    pub fn new(term: impl Into<String>, country: impl Into<String>) -> Self {
        SuggestRequest {
            term: term.into(),
            country: country.into(),
        }
    }
}

/// One entry of the JSON answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Suggestion {
    pub city: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
}

impl From<&PlaceRecord> for Suggestion {
    fn from(r: &PlaceRecord) -> Self {
        Suggestion {
            city: r.city.clone(),
            postal_code: r.postal_code.clone(),
            state_code: r.region_code.clone(),
        }
    }
}

impl From<PlaceRecord> for Suggestion {
    fn from(r: PlaceRecord) -> Self {
        Suggestion {
            city: r.city,
            postal_code: r.postal_code,
            state_code: r.region_code,
        }
    }
}

/// Run one request through the engine.
pub fn handle(engine: &SuggestionEngine, request: &SuggestRequest) -> Result<Vec<Suggestion>> {
    let term = sanitize_term(&request.term);
    let records = engine.suggest(&term, &request.country)?;
    Ok(records.into_iter().map(Suggestion::from).collect())
}

/// JSON in, JSON array out.
pub fn handle_json(engine: &SuggestionEngine, body: &str) -> Result<String> {
    let request: SuggestRequest = serde_json::from_str(body)?;
    let out = handle(engine, &request)?;
    Ok(serde_json::to_string(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::GazetteerStore;
    use crate::model::EnabledCountrySet;
    use std::fs;

    fn engine() -> (tempfile::TempDir, SuggestionEngine) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("BG.txt"),
            "BG\t1000\tSofia\tSofia-Grad\t22\nBG\t4000\tPlovdiv\n",
        )
        .unwrap();
        let engine = SuggestionEngine::in_memory(
            GazetteerStore::new(dir.path()),
            EnabledCountrySet::from_codes(["BG"]),
        );
        (dir, engine)
    }

    #[test]
    fn control_characters_are_stripped_before_matching() {
        let (_d, engine) = engine();
        let out = handle(&engine, &SuggestRequest::new("s\u{0}o\u{7}f", "BG")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].city, "Sofia");
    }

    #[test]
    fn control_only_term_is_too_short() {
        let (_d, engine) = engine();
        let out = handle(&engine, &SuggestRequest::new("p\u{1b}\u{1b}", "BG")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn state_code_is_omitted_when_absent() {
        let (_d, engine) = engine();
        let json = handle_json(&engine, r#"{"term":"o","country":"BG"}"#).unwrap();
        assert_eq!(json, "[]");

        let json = handle_json(&engine, r#"{"term":"plov","country":"BG"}"#).unwrap();
        assert_eq!(json, r#"[{"city":"Plovdiv","postal_code":"4000"}]"#);

        let json = handle_json(&engine, r#"{"term":"sof","country":"bg"}"#).unwrap();
        assert_eq!(
            json,
            r#"[{"city":"Sofia","postal_code":"1000","state_code":"22"}]"#
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let (_d, engine) = engine();
        assert_eq!(handle_json(&engine, "{}").unwrap(), "[]");
        assert!(handle_json(&engine, "not json").is_err());
    }
}
