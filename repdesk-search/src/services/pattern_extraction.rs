//! Pattern extraction over rendered repertory pages
//!
//! Recovers (name, IPI number) pairs from a rendered search page. Four stages
//! run in strict precedence and the first one that yields at least one valid
//! record wins:
//!
//! 1. `script` - entries returned by the DOM-scan script run inside the page
//! 2. `html` - table-row-like fragments of the raw HTML
//! 3. `markdown` - `Name | 123456789`, `Name - 123456789` and pipe-table rows
//! 4. `line` - capitalized words on (or just above) a line holding a number
//!
//! Every stage is a pure function over [`ExtractionInput`]; formatting,
//! validation, de-duplication and the record cap are applied uniformly
//! afterwards by [`finalize`].

use regex::Regex;
use repdesk_common::{SearchCategory, SearchResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use super::name_formatter::{format_name, is_acceptable_name};

/// Upper bound on records returned for one adapter call
pub const MAX_RECORDS: usize = 50;

/// One entry returned by the in-page DOM-scan script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptEntry {
    pub name: String,
    #[serde(alias = "ipiNumber", alias = "identifyingNumber")]
    pub ipi: String,
}

/// Raw rendered content handed to the stages
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionInput<'a> {
    pub markdown: &'a str,
    pub html: &'a str,
    pub script_entries: &'a [ScriptEntry],
}

/// Unvalidated (name, number) pair produced by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub ipi: String,
}

impl Candidate {
    fn new(name: impl Into<String>, ipi: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ipi: ipi.into(),
        }
    }
}

/// Extraction stage: pure function from rendered content to candidates
pub type Stage = fn(&ExtractionInput<'_>) -> Vec<Candidate>;

/// Stages in precedence order
pub const STAGES: &[(&str, Stage)] = &[
    ("script", script_stage),
    ("html", html_stage),
    ("markdown", markdown_stage),
    ("line", line_stage),
];

/// Run the default stage chain
pub fn extract(
    input: &ExtractionInput<'_>,
    category: SearchCategory,
    source: &str,
) -> Vec<SearchResult> {
    extract_with(STAGES, input, category, source)
}

/// Run a stage chain, stopping at the first stage that yields valid records
pub fn extract_with(
    stages: &[(&str, Stage)],
    input: &ExtractionInput<'_>,
    category: SearchCategory,
    source: &str,
) -> Vec<SearchResult> {
    for (label, stage) in stages {
        let records = finalize(stage(input), category, source);
        if !records.is_empty() {
            debug!(
                stage = %label,
                source = %source,
                records = records.len(),
                "Extraction stage matched"
            );
            return records;
        }
    }

    debug!(source = %source, "No extraction stage matched");
    Vec::new()
}

/// Format, validate, de-duplicate by number and cap candidates
///
/// Order is first-seen. The category and source come from the caller, never
/// from the content.
pub fn finalize(
    candidates: Vec<Candidate>,
    category: SearchCategory,
    source: &str,
) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for candidate in candidates {
        let ipi = candidate.ipi.trim();
        if !is_ipi(ipi) {
            continue;
        }

        let name = format_name(&clean_markup(&candidate.name));
        if !is_acceptable_name(&name) {
            continue;
        }

        if !seen.insert(ipi.to_string()) {
            continue;
        }

        records.push(SearchResult {
            name,
            ipi_number: ipi.to_string(),
            category,
            source: source.to_string(),
        });

        if records.len() == MAX_RECORDS {
            break;
        }
    }

    records
}

/// 9 to 11 ASCII digits, nothing else
pub fn is_ipi(s: &str) -> bool {
    (9..=11).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Stages
// ============================================================================

/// Stage 1: trust what the in-page script already paired up
pub fn script_stage(input: &ExtractionInput<'_>) -> Vec<Candidate> {
    input
        .script_entries
        .iter()
        .map(|e| Candidate::new(e.name.clone(), e.ipi.clone()))
        .collect()
}

/// Stage 2: table rows (and list items) of the raw HTML
///
/// Within a row, the first text segment carrying a bare number is paired with
/// the first earlier segment that reads like a name.
pub fn html_stage(input: &ExtractionInput<'_>) -> Vec<Candidate> {
    static ROW: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let row_re = ROW.get_or_init(|| {
        Regex::new(r"(?is)<(?:tr|li)\b[^>]*>(.*?)</(?:tr|li)>").expect("valid row regex")
    });
    let tag_re = TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

    let mut candidates = Vec::new();
    for row in row_re.captures_iter(input.html) {
        let segments: Vec<String> = tag_re
            .split(&row[1])
            .map(|s| decode_entities(s).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if let Some(candidate) = pair_segments(&segments) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Stage 3: delimiter patterns and pipe tables in the markdown
pub fn markdown_stage(input: &ExtractionInput<'_>) -> Vec<Candidate> {
    static DELIMITED: OnceLock<Regex> = OnceLock::new();
    let delimited_re = DELIMITED.get_or_init(|| {
        Regex::new(
            concat!(
                r"(?m)^[ \t]*(?:[-*+][ \t]+)?([\p{L}*_\[][^|\n\d]{0,120}?)",
                r"[ \t]*(?:\||-|\x{2013}|\x{2014})[ \t]*(?:(?i:ipi)[ \t#:]*)?(\d{9,11})\b",
            ),
        )
        .expect("valid delimiter regex")
    });

    let mut candidates = Vec::new();

    for line in input.markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('|') {
            let cells: Vec<String> = trimmed
                .trim_matches('|')
                .split('|')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if let Some(candidate) = pair_segments(&cells) {
                candidates.push(candidate);
            }
        } else if let Some(caps) = delimited_re.captures(line) {
            candidates.push(Candidate::new(caps[1].trim(), &caps[2]));
        }
    }

    candidates
}

/// Stage 4: capitalized words near a number, same line first, then the line above
pub fn line_stage(input: &ExtractionInput<'_>) -> Vec<Candidate> {
    let lines: Vec<&str> = input.markdown.lines().collect();
    let mut candidates = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(number) = ipi_regex().find(line) else {
            continue;
        };

        let rest = format!("{} {}", &line[..number.start()], &line[number.end()..]);
        let name = capitalized_span(&rest).or_else(|| {
            i.checked_sub(1)
                .and_then(|prev| capitalized_span(lines[prev]))
        });

        if let Some(name) = name {
            candidates.push(Candidate::new(name, number.as_str()));
        }
    }

    candidates
}

// ============================================================================
// Helpers
// ============================================================================

fn ipi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{9,11}\b").expect("valid ipi regex"))
}

/// Label words that sit next to names and numbers on repertory pages
const LABEL_WORDS: &[&str] = &[
    "ipi", "cae", "cae/ipi", "ipi/cae", "name", "number", "no", "no.", "#", "writer", "publisher",
    "composer", "affiliation", "pro", "society", "role",
];

fn is_label(segment: &str) -> bool {
    let normalized = segment
        .trim()
        .trim_end_matches([':', '#', ' '])
        .to_lowercase();
    normalized.is_empty()
        || normalized
            .split_whitespace()
            .all(|w| LABEL_WORDS.contains(&w))
}

/// Pull the bare number out of a cell like `123456789` or `IPI #: 123456789`
fn number_in_segment(segment: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:cae/)?ipi(?:/cae)?(?:\s*(?:#|no\.?|number))?\s*:?\s*)?(\d{9,11})$")
            .expect("valid cell regex")
    });
    re.captures(segment.trim()).map(|c| c[1].to_string())
}

fn looks_like_name(segment: &str) -> bool {
    !is_label(segment)
        && segment.chars().any(char::is_alphabetic)
        && number_in_segment(segment).is_none()
}

/// First number-bearing segment paired with the first earlier name-like segment
fn pair_segments(segments: &[String]) -> Option<Candidate> {
    let (index, number) = segments
        .iter()
        .enumerate()
        .find_map(|(i, s)| number_in_segment(s).map(|n| (i, n)))?;

    segments[..index]
        .iter()
        .find(|s| looks_like_name(s))
        .map(|name| Candidate::new(name.clone(), number))
}

/// Longest run of capitalized words, minus surrounding label words
fn capitalized_span(line: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\p{Lu}[\p{L}'.&-]*(?:[ \t]+\p{Lu}[\p{L}'.&-]*)*").expect("valid span regex")
    });

    let cleaned = clean_markup(line);
    re.find_iter(&cleaned)
        .map(|m| {
            m.as_str()
                .split_whitespace()
                .filter(|w| !is_label(w))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|span| span.chars().count() > 1)
        .max_by_key(|span| span.len())
}

/// Strip markdown emphasis, links and stray punctuation around a name
fn clean_markup(raw: &str) -> String {
    static LINK: OnceLock<Regex> = OnceLock::new();
    let link_re = LINK.get_or_init(|| {
        Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link regex")
    });

    let unlinked = link_re.replace_all(raw, "$1");
    let stripped: String = unlinked
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '\\' | '`' | '[' | ']'))
        .collect();
    decode_entities(&stripped)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';' | '|' | '-'))
        .to_string()
}

/// Decode the handful of HTML entities repertory pages actually use
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    let numeric_re =
        NUMERIC.get_or_init(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("valid entity regex"));

    let named = s
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    numeric_re
        .replace_all(&named, |caps: &regex::Captures<'_>| {
            let radix = if caps[1].is_empty() { 10 } else { 16 };
            u32::from_str_radix(&caps[2], radix)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        markdown: &'a str,
        html: &'a str,
        entries: &'a [ScriptEntry],
    ) -> ExtractionInput<'a> {
        ExtractionInput {
            markdown,
            html,
            script_entries: entries,
        }
    }

    fn entry(name: &str, ipi: &str) -> ScriptEntry {
        ScriptEntry {
            name: name.to_string(),
            ipi: ipi.to_string(),
        }
    }

    #[test]
    fn test_script_stage_wins_over_everything() {
        let entries = vec![entry("JANE DOE", "123456789")];
        let html = "<table><tr><td>Other Person</td><td>987654321</td></tr></table>";
        let markdown = "Someone Else | 555555555";

        let records = extract(&input(markdown, html, &entries), SearchCategory::Writer, "BMI");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jane Doe");
        assert_eq!(records[0].ipi_number, "123456789");
        assert_eq!(records[0].source, "BMI");
        assert_eq!(records[0].category, SearchCategory::Writer);
    }

    fn panicking_stage(_: &ExtractionInput<'_>) -> Vec<Candidate> {
        panic!("later stage must not run once an earlier stage matched");
    }

    #[test]
    fn test_later_stages_never_invoked_after_match() {
        let entries = vec![entry("Jane Doe", "123456789")];
        let stages: &[(&str, Stage)] = &[("script", script_stage), ("boom", panicking_stage)];

        let records = extract_with(stages, &input("", "", &entries), SearchCategory::Writer, "BMI");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_script_entries_fall_through() {
        // Script stage yields only invalid entries, so the html stage decides
        let entries = vec![entry("X", "123"), entry("123456789", "123456789")];
        let html = "<tr><td>JOHN SMITH</td><td>Writer</td><td>00123456789</td></tr>";

        let records = extract(&input("", html, &entries), SearchCategory::Writer, "ASCAP");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "John Smith");
        assert_eq!(records[0].ipi_number, "00123456789");
    }

    #[test]
    fn test_html_stage_skips_header_and_labels() {
        let html = r#"
            <table>
              <tr><th>Name</th><th>IPI</th></tr>
              <tr><td><a href="/w/1">SMITH JOHN &amp; CO</a></td><td>IPI #: 111222333</td></tr>
              <tr><td>No number here</td><td>Writer</td></tr>
            </table>"#;

        let found = html_stage(&input("", html, &[]));
        assert_eq!(found, vec![Candidate::new("SMITH JOHN & CO", "111222333")]);
    }

    #[test]
    fn test_markdown_delimiters_and_tables() {
        let markdown = "\
# Results
Jane Doe | 123456789
- **John Smith** - 987654321
| Name | Role | IPI |
|------|------|-----|
| MARY JONES | Writer | 555666777 |
";
        let found = markdown_stage(&input(markdown, "", &[]));
        assert_eq!(
            found,
            vec![
                Candidate::new("Jane Doe", "123456789"),
                Candidate::new("**John Smith**", "987654321"),
                Candidate::new("MARY JONES", "555666777"),
            ]
        );

        let records = finalize(found, SearchCategory::Publisher, "ASCAP");
        assert_eq!(records[1].name, "John Smith");
        assert!(records.iter().all(|r| r.category == SearchCategory::Publisher));
    }

    #[test]
    fn test_line_stage_uses_previous_line() {
        let markdown = "\
Some intro text
WILLIAMS PHARRELL L
IPI: 00234567890
SEAN COMBS IPI 345678901
";
        let found = line_stage(&input(markdown, "", &[]));
        assert_eq!(
            found,
            vec![
                Candidate::new("WILLIAMS PHARRELL L", "00234567890"),
                Candidate::new("SEAN COMBS", "345678901"),
            ]
        );
    }

    #[test]
    fn test_line_stage_only_runs_when_others_empty() {
        let markdown = "CALVIN BROADUS\n123456789\n";
        let records = extract(&input(markdown, "", &[]), SearchCategory::Writer, "BMI");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Calvin Broadus");
    }

    #[test]
    fn test_numbers_outside_range_are_ignored() {
        let markdown = "Jane Doe | 12345678\nJohn Doe | 123456789012\n";
        let records = extract(&input(markdown, "", &[]), SearchCategory::Writer, "BMI");
        assert!(records.is_empty());
    }

    #[test]
    fn test_duplicates_keep_first_seen() {
        let entries = vec![
            entry("First Name", "123456789"),
            entry("Second Name", "123456789"),
            entry("Third Name", "223456789"),
        ];
        let records = finalize(
            script_stage(&input("", "", &entries)),
            SearchCategory::Writer,
            "BMI",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "First Name");
        assert_eq!(records[1].ipi_number, "223456789");
    }

    #[test]
    fn test_records_capped() {
        let entries: Vec<ScriptEntry> = (0..120)
            .map(|i| entry(&format!("Writer Number {}", i), &format!("{:09}", 100_000_000 + i)))
            .collect();
        let records = extract(&input("", "", &entries), SearchCategory::Writer, "BMI");
        assert_eq!(records.len(), MAX_RECORDS);
        assert_eq!(records[0].ipi_number, "100000000");
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let records = extract(
            &input("nothing here", "<p>none</p>", &[]),
            SearchCategory::Writer,
            "BMI",
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("A&amp;B&nbsp;&#39;C&#x27;"), "A&B 'C'");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }
}
