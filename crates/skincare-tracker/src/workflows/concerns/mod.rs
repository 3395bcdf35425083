//! Display vocabulary for skin concerns and catalog attributes.
//!
//! Routine items store canonical tokens (`dry_skin`, `anti_aging`); every
//! surface that shows them to a person goes through [`normalize`].

mod mapping;
mod normalizer;

use serde::{Deserialize, Serialize};

/// The two independent token vocabularies the catalog and the user supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    /// User-facing concern list (e.g. `acne`, `redness`).
    Concerns,
    /// Catalog "good for" / "free of" attributes (e.g. `dry_skin`, `fragrance free`).
    Attributes,
}

/// Map a raw token to its display label.
///
/// Synonym table first, then the humanized fallback. Never fails.
pub fn normalize(vocabulary: Vocabulary, token: &str) -> String {
    let canonical = normalizer::canonical_token(token);
    let known = match vocabulary {
        Vocabulary::Concerns => mapping::concern_label(&canonical),
        Vocabulary::Attributes => mapping::attribute_label(&canonical),
    };

    match known {
        Some(label) => label.to_string(),
        None => normalizer::humanize(token.trim()),
    }
}

pub fn concern_label(token: &str) -> String {
    normalize(Vocabulary::Concerns, token)
}

pub fn attribute_label(token: &str) -> String {
    normalize(Vocabulary::Attributes, token)
}

/// Storage form of a concern token, used as the key for tracking records.
pub fn canonical_token(raw: &str) -> String {
    normalizer::canonical_token(raw)
}
