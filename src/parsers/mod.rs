pub mod rows;
pub mod status;

pub use rows::*;
pub use status::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce an entity name to its lookup key: lower-case letters and single spaces.
///
/// Flags, emoji, digits and punctuation are dropped, so `"Cyprus 🇨🇾"` and
/// `"CYPRUS"` both become `"cyprus"`. Applying it twice is a no-op.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
