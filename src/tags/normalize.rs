use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form of a tag: lowercase ASCII-folded words joined by `_`
///
/// Accents are stripped through NFD decomposition, punctuation is dropped and
/// runs of whitespace, hyphens and underscores collapse into one underscore.
///
/// ```
/// use folio::tags::normalize_tag;
/// assert_eq!(normalize_tag("  Economía Internacional "), "economia_internacional");
/// assert_eq!(normalize_tag("Supply-Chain (2025)"), "supply_chain_2025");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    let lowered = tag.trim().to_lowercase();

    let kept: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Drop repeated tags, keeping the first occurrence of each
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|tag| seen.insert(tag.clone())).collect()
}
