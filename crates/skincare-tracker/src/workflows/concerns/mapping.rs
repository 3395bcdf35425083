use super::normalizer::canonical_token;
use std::collections::HashMap;
use std::sync::OnceLock;

static CONCERN_LABELS: OnceLock<HashMap<String, &'static str>> = OnceLock::new();
static ATTRIBUTE_LABELS: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

pub(crate) fn concern_label(canonical: &str) -> Option<&'static str> {
    concern_labels().get(canonical).copied()
}

pub(crate) fn attribute_label(canonical: &str) -> Option<&'static str> {
    attribute_labels().get(canonical).copied()
}

fn concern_labels() -> &'static HashMap<String, &'static str> {
    CONCERN_LABELS.get_or_init(|| {
        const TOKEN_TO_LABEL: &[(&str, &str)] = &[
            // Breakouts
            ("acne", "Breakouts"),
            ("breakouts", "Breakouts"),
            ("blemishes", "Breakouts"),
            ("pimples", "Breakouts"),
            // Texture & pores
            ("pores", "Pores"),
            ("large_pores", "Pores"),
            ("enlarged_pores", "Pores"),
            ("texture", "Texture"),
            ("uneven_texture", "Texture"),
            ("blackheads", "Blackheads"),
            // Tone
            ("redness", "Redness"),
            ("rosacea", "Redness"),
            ("dark_spots", "Dark Spots"),
            ("hyperpigmentation", "Dark Spots"),
            ("pigmentation", "Dark Spots"),
            ("uneven_skin_tone", "Uneven Tone"),
            ("uneven_tone", "Uneven Tone"),
            ("dullness", "Dullness"),
            ("dark_circles", "Dark Circles"),
            // Aging
            ("wrinkles", "Fine Lines & Wrinkles"),
            ("fine_lines", "Fine Lines & Wrinkles"),
            ("fine_lines_wrinkles", "Fine Lines & Wrinkles"),
            ("anti_aging", "Anti-Aging"),
            ("aging", "Anti-Aging"),
            ("firmness", "Firmness"),
            ("sagging", "Firmness"),
            // Hydration & oil
            ("dry_skin", "Dry Skin"),
            ("dryness", "Dry Skin"),
            ("dehydration", "Dehydration"),
            ("oily_skin", "Oily Skin"),
            ("oiliness", "Oily Skin"),
            ("excess_oil", "Oily Skin"),
            ("sensitivity", "Sensitivity"),
            ("sensitive_skin", "Sensitivity"),
            ("eye_bags", "Under-Eye Puffiness"),
            ("puffiness", "Under-Eye Puffiness"),
        ];

        build_table(TOKEN_TO_LABEL)
    })
}

fn attribute_labels() -> &'static HashMap<String, &'static str> {
    ATTRIBUTE_LABELS.get_or_init(|| {
        const TOKEN_TO_LABEL: &[(&str, &str)] = &[
            // Good-for
            ("dry_skin", "Dry Skin"),
            ("oily_skin", "Oily Skin"),
            ("combination_skin", "Combination Skin"),
            ("normal_skin", "Normal Skin"),
            ("sensitive_skin", "Sensitive Skin"),
            ("acne_prone", "Acne-Prone Skin"),
            ("acne_prone_skin", "Acne-Prone Skin"),
            ("anti_aging", "Anti-Aging"),
            ("brightening", "Brightening"),
            ("hydrating", "Hydrating"),
            ("soothing", "Soothing"),
            ("spf", "SPF"),
            ("uv_protection", "UV Protection"),
            // Free-of
            ("fragrance_free", "Fragrance-Free"),
            ("paraben_free", "Paraben-Free"),
            ("sulfate_free", "Sulfate-Free"),
            ("alcohol_free", "Alcohol-Free"),
            ("oil_free", "Oil-Free"),
            ("silicone_free", "Silicone-Free"),
            ("non_comedogenic", "Non-Comedogenic"),
            ("cruelty_free", "Cruelty-Free"),
            ("vegan", "Vegan"),
            ("gluten_free", "Gluten-Free"),
        ];

        build_table(TOKEN_TO_LABEL)
    })
}

fn build_table(entries: &[(&str, &'static str)]) -> HashMap<String, &'static str> {
    let mut map = HashMap::with_capacity(entries.len());
    for (token, label) in entries {
        map.insert(canonical_token(token), *label);
    }
    // A label fed back in maps to itself.
    for (_, label) in entries {
        map.entry(canonical_token(label)).or_insert(*label);
    }
    map
}
