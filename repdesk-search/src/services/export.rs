//! Saved-record export (CSV and JSON)

use chrono::{DateTime, SecondsFormat, Utc};
use repdesk_common::{Error, SavedRecord};
use serde::Serialize;
use std::str::FromStr;

pub const CSV_HEADER: &str = "Name,IPI Number,Type,Date Saved";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "saved-records.csv",
            ExportFormat::Json => "saved-records.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::InvalidInput(format!("Unsupported export format: {}", other))),
        }
    }
}

/// ISO-8601 with milliseconds and `Z`
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Header row plus one quoted row per record
pub fn to_csv(records: &[SavedRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        let row = [
            quote(&record.name),
            quote(&record.ipi_number),
            quote(record.category.as_str()),
            quote(&iso_timestamp(&record.created_at)),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedRecord<'a> {
    name: &'a str,
    ipi_number: &'a str,
    #[serde(rename = "type")]
    category: &'a str,
    date_saved: String,
}

/// Pretty-printed array of `{name, ipiNumber, type, dateSaved}`
pub fn to_json(records: &[SavedRecord]) -> serde_json::Result<String> {
    let exported: Vec<ExportedRecord<'_>> = records
        .iter()
        .map(|r| ExportedRecord {
            name: &r.name,
            ipi_number: &r.ipi_number,
            category: r.category.as_str(),
            date_saved: iso_timestamp(&r.created_at),
        })
        .collect();
    serde_json::to_string_pretty(&exported)
}

/// Render `records` in `format`
pub fn export(records: &[SavedRecord], format: ExportFormat) -> repdesk_common::Result<String> {
    match format {
        ExportFormat::Csv => Ok(to_csv(records)),
        ExportFormat::Json => to_json(records)
            .map_err(|e| Error::Internal(format!("JSON export failed: {}", e))),
    }
}
