/// Canonical lookup key for a concern or attribute token.
///
/// Trims, lowercases, and collapses any run of whitespace, `-` or `_` into a
/// single underscore so `"Fragrance  Free"`, `"fragrance-free"` and
/// `"fragrance_free"` share one key.
pub(crate) fn canonical_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Fallback label: split on `_` or space and title-case each word, so
/// `ACNE_SCARS` and `acne scars` both read `Acne Scars`.
pub(crate) fn humanize(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
