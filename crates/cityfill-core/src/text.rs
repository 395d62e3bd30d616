// crates/cityfill-core/src/text.rs

//! # Text folding
//!
//! Everything that compares user input against gazetteer names goes through
//! [`normalize`]. Both sides of a comparison must be folded with the same
//! function, so the helpers here take raw text and fold it themselves.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a string into its accent-insensitive, case-insensitive comparison key.
///
/// This performs:
/// 1\) Canonical decomposition (NFD), so `Ş` becomes `S` + U+0327
/// 2\) Removal of every combining mark
/// 3\) Lowercasing
///
/// Scripts are never transliterated: `Варна` folds to `варна`, not `varna`.
///
/// # Examples
///
/// ```rust
/// use cityfill_core::text::normalize;
///
/// assert_eq!(normalize("Örebro"), "orebro");
/// assert_eq!(normalize("Brașov"), normalize("BRASOV"));
/// assert_eq!(normalize("Варна"), "варна");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }
    let stripped = strip_marks(text);
    // Lowercasing can reintroduce a mark (İ -> i + U+0307), so fold once more.
    strip_marks(&stripped.to_lowercase())
}

fn strip_marks(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Compares two strings for equality after folding with [`normalize`].
pub fn equals_folded(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Clean untrusted free text before it reaches the matcher.
///
/// Control characters are dropped, runs of whitespace collapse to a single
/// space and the result is trimmed.
///
/// ```rust
/// use cityfill_core::text::sanitize_term;
///
/// assert_eq!(sanitize_term("  So\u{0}fia\t\n "), "Sofia");
/// assert_eq!(sanitize_term("Stara   Zagora"), "Stara Zagora");
/// ```
pub fn sanitize_term(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// Name-based matching helpers for types that expose a display name.
///
/// Implementors provide a `&str` view of their name via
/// [`NameMatch::name_str`], and get accent- and case-insensitive helpers
/// built on [`normalize`].
///
/// # Examples
/// ```rust
/// use cityfill_core::text::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Łódź").name_contains("od"));
/// assert!(Place("Zürich").is_named("zurich"));
/// ```
pub trait NameMatch {
    /// Returns the display name used for matching.
    fn name_str(&self) -> &str;

    /// Equality on the folded form.
    #[inline]
    fn is_named(&self, q: &str) -> bool {
        equals_folded(self.name_str(), q)
    }

    /// Substring match on the folded form.
    #[inline]
    fn name_contains(&self, q: &str) -> bool {
        normalize(self.name_str()).contains(&normalize(q))
    }
}
