//! Candidate name normalization

/// Collapse whitespace, trim, and title-case every word
///
/// `"  JOHN   o'BRIEN "` becomes `"John O'brien"`. Idempotent.
pub fn format_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A first letter whose uppercase form is several chars (`ß`, `ﬁ`) stays as
/// is, otherwise a second pass would lowercase the expansion.
fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let upper: String = first.to_uppercase().collect();
    let mut out = if upper.chars().count() == 1 {
        upper
    } else {
        first.to_string()
    };
    out.extend(chars.flat_map(char::to_lowercase));
    out
}

/// Accept a formatted name if it is 2..=100 chars long and not purely numeric
pub fn is_acceptable_name(name: &str) -> bool {
    let len = name.chars().count();
    if len <= 1 || len > 100 {
        return false;
    }
    !name
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace())
}
