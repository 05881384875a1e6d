//! Search categories and search results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which repertory index a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    Writer,
    Publisher,
    Performer,
}

impl SearchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::Writer => "writer",
            SearchCategory::Publisher => "publisher",
            SearchCategory::Performer => "performer",
        }
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "writer" => Ok(SearchCategory::Writer),
            "publisher" => Ok(SearchCategory::Publisher),
            "performer" => Ok(SearchCategory::Performer),
            other => Err(Error::InvalidInput(format!("Unknown search type: {}", other))),
        }
    }
}

/// One (name, IPI number) pair recovered from a repertory page
///
/// Immutable once produced. Within one extraction call the key is
/// (`source`, `ipi_number`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub name: String,
    /// 9 to 11 digit IPI/CAE number
    pub ipi_number: String,
    #[serde(rename = "type")]
    pub category: SearchCategory,
    /// Originating repertory ("BMI", "ASCAP")
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("Writer".parse::<SearchCategory>().unwrap(), SearchCategory::Writer);
        assert_eq!(" publisher ".parse::<SearchCategory>().unwrap(), SearchCategory::Publisher);
        assert!("composer".parse::<SearchCategory>().is_err());
    }

    #[test]
    fn test_search_result_wire_format() {
        let result = SearchResult {
            name: "Jane Doe".to_string(),
            ipi_number: "123456789".to_string(),
            category: SearchCategory::Writer,
            source: "BMI".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ipiNumber"], "123456789");
        assert_eq!(json["type"], "writer");
        assert_eq!(json["source"], "BMI");
    }
}
