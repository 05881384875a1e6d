//! Repertory source adapters
//!
//! One adapter per external repertory. Each builds the repertory's search URL,
//! asks the renderer for the page with a fixed interaction (wait, accept the
//! disclaimer, wait, scan the DOM) and runs pattern extraction over whatever
//! comes back.
//!
//! Adapters never fail past their boundary: provider errors are logged and
//! reported as an empty result list.

use repdesk_common::{Error, SearchCategory, SearchResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::pattern_extraction::{extract, ExtractionInput, ScriptEntry, MAX_RECORDS};
use super::render_client::{PageRenderer, RenderAction, RenderRequest};

/// Supported performing-rights repertories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repertory {
    Bmi,
    Ascap,
}

impl Repertory {
    pub const ALL: [Repertory; 2] = [Repertory::Bmi, Repertory::Ascap];

    /// Source identifier attached to every result
    pub fn name(&self) -> &'static str {
        match self {
            Repertory::Bmi => "BMI",
            Repertory::Ascap => "ASCAP",
        }
    }

    /// Visible button/link texts that accept the repertory's disclaimer
    pub fn agree_labels(&self) -> &'static [&'static str] {
        match self {
            Repertory::Bmi => &["I Agree", "Accept"],
            Repertory::Ascap => &["I Accept", "I Agree", "Accept"],
        }
    }

    /// Search page URL for one query. Performer queries use the writer index.
    pub fn search_url(&self, query: &str, category: SearchCategory) -> String {
        let encoded = urlencoding::encode(query.trim());
        match self {
            Repertory::Bmi => {
                let index = match category {
                    SearchCategory::Publisher => "Publisher",
                    SearchCategory::Writer | SearchCategory::Performer => "Writer%2FComposer",
                };
                format!(
                    concat!(
                        "https://repertoire.bmi.com/Search/Search",
                        "?SearchForm.Main_Search={}&SearchForm.Main_Search_Text={}",
                        "&SearchForm.Search_Type=all&SearchForm.View_Count=100",
                    ),
                    index, encoded
                )
            }
            Repertory::Ascap => {
                let index = match category {
                    SearchCategory::Publisher => "publisher",
                    SearchCategory::Writer | SearchCategory::Performer => "writer",
                };
                format!("https://www.ascap.com/repertory#/ace/search/{}/{}", index, encoded)
            }
        }
    }
}

impl fmt::Display for Repertory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Repertory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BMI" => Ok(Repertory::Bmi),
            "ASCAP" => Ok(Repertory::Ascap),
            other => Err(Error::Config(format!("Unknown repertory: {}", other))),
        }
    }
}

/// Clicks the first button or link whose visible text exactly equals a label
pub fn disclaimer_click_script(labels: &[&str]) -> String {
    let labels_json = serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
  const labels = {labels_json};
  const nodes = Array.from(document.querySelectorAll('button, a, input[type="button"], input[type="submit"]'));
  const target = nodes.find((el) => labels.includes(((el.innerText || el.value || '') + '').trim()));
  if (target) {{ target.click(); return true; }}
  return false;
}})()"#
    )
}

/// Walks the rendered DOM for names next to 9-11 digit numbers
///
/// First pass: leaf elements mentioning "IPI" (or whose label sibling does),
/// paired with a name found in the enclosing row/result container. Second
/// pass, only when the first found nothing: anchors and name-classed elements
/// whose container holds such a number.
pub const DOM_SCAN_SCRIPT: &str = r#"(() => {
  const IPI = /\b(\d{9,11})\b/;
  const results = [];
  const seen = new Set();
  const push = (name, ipi) => {
    const clean = (name || '').replace(/\s+/g, ' ').trim();
    if (!clean || /^\d+$/.test(clean) || seen.has(ipi)) return;
    seen.add(ipi);
    results.push({ name: clean, ipi });
  };
  const nameIn = (container) => {
    const el = container.querySelector('a, [class*="name" i], strong, b, h2, h3, h4, td');
    return el ? el.textContent : '';
  };
  document.querySelectorAll('body *').forEach((el) => {
    if (el.children.length > 0) return;
    const text = el.textContent || '';
    const label = el.previousElementSibling ? el.previousElementSibling.textContent || '' : '';
    if (!/ipi/i.test(text) && !/ipi/i.test(label)) return;
    const next = el.nextElementSibling ? el.nextElementSibling.textContent || '' : '';
    const m = text.match(IPI) || next.match(IPI);
    if (!m) return;
    const container = el.closest('tr, li, [class*="result" i], [class*="row" i], [class*="card" i]');
    if (container) push(nameIn(container), m[1]);
  });
  if (results.length === 0) {
    document.querySelectorAll('a, [class*="name" i]').forEach((el) => {
      const container = el.closest('tr, li, [class*="result" i], [class*="row" i], [class*="card" i]');
      if (!container) return;
      const m = (container.textContent || '').match(IPI);
      if (m) push(el.textContent, m[1]);
    });
  }
  return results.slice(0, 50);
})()"#;

/// Collect `{name, ipi}` entries from script return values
///
/// Values may be arrays or JSON strings holding arrays; anything else (the
/// click script's boolean, malformed entries) is skipped.
pub fn parse_script_entries(values: &[Value]) -> Vec<ScriptEntry> {
    let mut entries = Vec::new();

    for value in values {
        let parsed;
        let value = match value {
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(v) => {
                    parsed = v;
                    &parsed
                }
                Err(_) => continue,
            },
            other => other,
        };

        if let Value::Array(items) = value {
            entries.extend(
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<ScriptEntry>(item.clone()).ok()),
            );
        }

        if entries.len() >= MAX_RECORDS {
            break;
        }
    }

    entries
}

/// Search adapter for one repertory
pub struct RepertoryAdapter {
    repertory: Repertory,
    renderer: Arc<dyn PageRenderer>,
    wait_ms: u64,
}

impl RepertoryAdapter {
    pub fn new(repertory: Repertory, renderer: Arc<dyn PageRenderer>, wait_ms: u64) -> Self {
        Self {
            repertory,
            renderer,
            wait_ms,
        }
    }

    pub fn repertory(&self) -> Repertory {
        self.repertory
    }

    /// Render request: wait, accept disclaimer, wait, scan DOM
    pub fn render_request(&self, query: &str, category: SearchCategory) -> RenderRequest {
        RenderRequest::new(self.repertory.search_url(query, category)).with_actions(vec![
            RenderAction::Wait {
                milliseconds: self.wait_ms,
            },
            RenderAction::ExecuteJavascript {
                script: disclaimer_click_script(self.repertory.agree_labels()),
            },
            RenderAction::Wait {
                milliseconds: self.wait_ms,
            },
            RenderAction::ExecuteJavascript {
                script: DOM_SCAN_SCRIPT.to_string(),
            },
        ])
    }

    /// Search the repertory; provider failures yield an empty list
    pub async fn search(&self, query: &str, category: SearchCategory) -> Vec<SearchResult> {
        let request = self.render_request(query, category);

        let page = match self.renderer.render(&request).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    source = %self.repertory,
                    category = %category,
                    query = %query,
                    error = %e,
                    "Repertory fetch failed, returning no results"
                );
                return Vec::new();
            }
        };

        let script_entries = parse_script_entries(&page.script_returns);
        let input = ExtractionInput {
            markdown: &page.markdown,
            html: &page.html,
            script_entries: &script_entries,
        };
        let results = extract(&input, category, self.repertory.name());

        info!(
            source = %self.repertory,
            category = %category,
            query = %query,
            records = results.len(),
            "Repertory search complete"
        );

        results
    }
}
