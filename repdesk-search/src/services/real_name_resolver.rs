//! Performer legal-name resolution
//!
//! Fetches the encyclopedia article for a stage name and mines its markdown
//! for the person's birth name. Heuristics are tried in priority order; the
//! first one producing a plausible candidate wins. Finding nothing is a normal
//! outcome, not an error.

use regex::{Captures, Regex};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::render_client::{PageRenderer, RenderRequest};

const REFERENCE_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

/// One text heuristic: a pattern and how to pull a candidate out of a match
pub struct NameHeuristic {
    pub label: &'static str,
    pub pattern: Regex,
    pub extract: fn(&Captures<'_>) -> Option<String>,
}

impl NameHeuristic {
    fn new(
        label: &'static str,
        pattern: &str,
        extract: fn(&Captures<'_>) -> Option<String>,
    ) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).expect("valid heuristic regex"),
            extract,
        }
    }
}

/// Built-in heuristics, highest priority first
pub fn heuristics() -> &'static [NameHeuristic] {
    static HEURISTICS: OnceLock<Vec<NameHeuristic>> = OnceLock::new();
    HEURISTICS.get_or_init(|| {
        vec![
            // | Born | Calvin Cordozar Broadus Jr.<br>...
            NameHeuristic::new(
                "infobox-born",
                r"(?im)^\|?[ \t]*\**Born\**[ \t]*\|[ \t]*([^|<\n(]+)",
                first_group_without_digits,
            ),
            // ... was born Calvin Cordozar Broadus Jr. in ...
            NameHeuristic::new(
                "born-sentence",
                r"\b[Bb]orn[ \t]+(\p{Lu}[\p{L}.'-]*(?:[ \t]+\p{Lu}[\p{L}.'-]*)+)",
                first_group_without_digits,
            ),
            // Snoop Dogg (born Calvin Cordozar Broadus Jr.; October 20, 1971)
            NameHeuristic::new(
                "lead-born",
                r"\(born[ \t]+([^;,)\n]+)",
                first_group_without_digits,
            ),
            // **Calvin Cordozar Broadus Jr.**, known professionally as Snoop Dogg
            NameHeuristic::new(
                "known-professionally",
                concat!(
                    r"(\p{Lu}[\p{L}.'-]*(?:[ \t]+\p{Lu}[\p{L}.'-]*)+)\**,[ \t]+",
                    r"(?:better[ \t]+)?known[ \t]+professionally[ \t]+as",
                ),
                first_group_without_digits,
            ),
            // Birth name: Calvin Cordozar Broadus Jr.
            NameHeuristic::new(
                "birth-name-label",
                r"(?i)birth[ \t]+name[ \t]*\**[ \t]*[:|][ \t]*([^\n<|*]+)",
                first_group_without_digits,
            ),
        ]
    })
}

/// First capture group, tidied; dates and ages never count as names
fn first_group_without_digits(caps: &Captures<'_>) -> Option<String> {
    let candidate = tidy_candidate(caps.get(1)?.as_str());
    if candidate.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(candidate)
}

fn tidy_candidate(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '*' | '"' | '|'))
        .trim()
        .to_string()
}

/// Accept a candidate with at least two words, 6..=59 chars, not containing
/// the stage name
pub fn is_plausible_real_name(candidate: &str, stage_name: &str) -> bool {
    let len = candidate.chars().count();
    candidate.split_whitespace().count() >= 2
        && len > 5
        && len < 60
        && !candidate
            .to_lowercase()
            .contains(&stage_name.trim().to_lowercase())
}

/// Replace `[text](target)` links with their text
fn strip_links(markdown: &str) -> String {
    static LINK: OnceLock<Regex> = OnceLock::new();
    let re = LINK.get_or_init(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));
    re.replace_all(markdown, "$1").into_owned()
}

/// Apply the built-in heuristics to an article's markdown
pub fn find_real_name(markdown: &str, stage_name: &str) -> Option<String> {
    find_real_name_with(heuristics(), markdown, stage_name)
}

/// Apply `heuristics` in order; within one heuristic, matches are tried in
/// document order
pub fn find_real_name_with(
    heuristics: &[NameHeuristic],
    markdown: &str,
    stage_name: &str,
) -> Option<String> {
    let text = strip_links(markdown);

    for heuristic in heuristics {
        let found = heuristic
            .pattern
            .captures_iter(&text)
            .filter_map(|caps| (heuristic.extract)(&caps))
            .find(|candidate| is_plausible_real_name(candidate, stage_name));

        if let Some(name) = found {
            debug!(heuristic = heuristic.label, name = %name, "Real name heuristic matched");
            return Some(name);
        }
    }

    None
}

/// Reference article URL: spaces become underscores
pub fn reference_url(stage_name: &str) -> String {
    let title = stage_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}{}", REFERENCE_BASE_URL, urlencoding::encode(&title))
}

/// Resolves a performer's stage name to a legal name
pub struct RealNameResolver {
    renderer: Arc<dyn PageRenderer>,
}

impl RealNameResolver {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// `None` when the article is missing, unreachable, or names nobody
    pub async fn resolve(&self, stage_name: &str) -> Option<String> {
        let request = RenderRequest::new(reference_url(stage_name));

        let page = match self.renderer.render(&request).await {
            Ok(page) => page,
            Err(e) => {
                warn!(stage_name = %stage_name, error = %e, "Reference page fetch failed");
                return None;
            }
        };

        let real_name = find_real_name(&page.markdown, stage_name);
        info!(
            stage_name = %stage_name,
            real_name = real_name.as_deref().unwrap_or("<none>"),
            "Real name resolution complete"
        );
        real_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infobox_born_row() {
        let markdown = concat!(
            "| Born | Calvin Cordozar Broadus Jr.<br>(1971-10-20) October 20, 1971 (age 53)",
            "<br>Long Beach |"
        );
        assert_eq!(
            find_real_name(markdown, "Snoop Dogg").as_deref(),
            Some("Calvin Cordozar Broadus Jr.")
        );
    }

    #[test]
    fn test_infobox_date_only_falls_through() {
        let markdown = "\
| Born | October 20, 1971 (age 53)<br>Long Beach |

Snoop Dogg (born Calvin Cordozar Broadus Jr.; October 20, 1971) is an American rapper.";
        assert_eq!(
            find_real_name(markdown, "Snoop Dogg").as_deref(),
            Some("Calvin Cordozar Broadus Jr.")
        );
    }

    #[test]
    fn test_born_sentence_with_links() {
        let markdown =
            "He was born [Shawn Corey Carter](https://en.wikipedia.org/wiki/x) in Brooklyn.";
        assert_eq!(
            find_real_name(markdown, "Jay-Z").as_deref(),
            Some("Shawn Corey Carter")
        );
    }

    #[test]
    fn test_known_professionally_as() {
        let markdown = "Onika Tanya Maraj-Petty, known professionally as Nicki Minaj, is a rapper.";
        assert_eq!(
            find_real_name(markdown, "Nicki Minaj").as_deref(),
            Some("Onika Tanya Maraj-Petty")
        );
    }

    #[test]
    fn test_known_professionally_with_bold_lead() {
        let markdown = concat!(
            "**Marshall Bruce Mathers III**, known professionally as Eminem, ",
            "is an American rapper."
        );
        assert_eq!(
            find_real_name(markdown, "Eminem").as_deref(),
            Some("Marshall Bruce Mathers III")
        );
    }

    #[test]
    fn test_birth_name_label() {
        let markdown = "Birth name: Stefani Joanne Angelina Germanotta\n";
        assert_eq!(
            find_real_name(markdown, "Lady Gaga").as_deref(),
            Some("Stefani Joanne Angelina Germanotta")
        );
    }

    #[test]
    fn test_infobox_takes_precedence() {
        let markdown = "\
| Born | Marshall Bruce Mathers III<br> |
Someone Else Entirely, known professionally as Eminem";
        assert_eq!(
            find_real_name(markdown, "Eminem").as_deref(),
            Some("Marshall Bruce Mathers III")
        );
    }

    #[test]
    fn test_stage_name_is_never_returned() {
        let markdown = "Snoop Dogg (born Snoop Dogg Broadus; 1971) | Born | SNOOP DOGG THE GREAT";
        assert_eq!(find_real_name(markdown, "Snoop Dogg"), None);
    }

    #[test]
    fn test_no_pattern_is_none() {
        let markdown = "Cher is a singer and actress from California.";
        assert_eq!(find_real_name(markdown, "Cher"), None);
    }

    #[test]
    fn test_plausibility_bounds() {
        assert!(!is_plausible_real_name("Prince", "X"));
        assert!(!is_plausible_real_name("Al Bo", "X"));
        assert!(is_plausible_real_name("Al Bob", "X"));
        assert!(!is_plausible_real_name(&format!("A {}", "b".repeat(58)), "X"));
    }

    #[test]
    fn test_reference_url() {
        assert_eq!(reference_url("Snoop Dogg"), "https://en.wikipedia.org/wiki/Snoop_Dogg");
        assert_eq!(reference_url("  Lady   Gaga "), "https://en.wikipedia.org/wiki/Lady_Gaga");
    }
}
