//! Article title normalization.
//!
//! Titles are case-preserving for display and outbound requests, but two
//! titles name the same article when they are equal after Unicode NFC
//! normalization and lowercasing. All visited-set keys and target
//! comparisons go through [`normalize`].

use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form of a title: NFC-normalized, lowercased.
pub fn normalize(title: &str) -> String {
    title.trim().nfc().collect::<String>().to_lowercase()
}

/// Whether two raw titles name the same article.
pub fn titles_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
