//! Saved-records collection
//!
//! Select, insert and delete only. Records are write-once; concurrent inserts
//! from several clients simply all land (last write wins at the row level).

use chrono::{DateTime, SecondsFormat, Utc};
use repdesk_common::{Error, Result, SavedRecord, SearchCategory};
use serde::Deserialize;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

/// Item the client asks to save
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedRecord {
    pub name: String,
    #[serde(alias = "identifyingNumber", alias = "ipi_number")]
    pub ipi_number: String,
    #[serde(rename = "type", alias = "category")]
    pub category: SearchCategory,
}

/// Drop repeated (category, number) pairs, keeping the first
pub fn dedupe_selection(items: &[NewSavedRecord]) -> Vec<&NewSavedRecord> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((item.category, item.ipi_number.trim().to_string())))
        .collect()
}

/// Fixed-precision RFC 3339 so text order equals time order
fn storage_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<SavedRecord> {
    let category: String = row.get("type");
    let created_at: String = row.get("created_at");

    Ok(SavedRecord {
        id: row.get("id"),
        name: row.get("name"),
        ipi_number: row.get("ipi_number"),
        category: category.parse()?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| Error::Internal(format!("Bad created_at '{}': {}", created_at, e)))?
            .with_timezone(&Utc),
    })
}

/// Every saved record, newest first
pub async fn list(pool: &SqlitePool) -> Result<Vec<SavedRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, ipi_number, type, created_at
        FROM saved_records
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Save a selection in one transaction and return the stored rows
///
/// Blank names or numbers reject the whole batch.
pub async fn insert(pool: &SqlitePool, items: &[NewSavedRecord]) -> Result<Vec<SavedRecord>> {
    if let Some(bad) = items
        .iter()
        .find(|i| i.name.trim().is_empty() || i.ipi_number.trim().is_empty())
    {
        return Err(Error::InvalidInput(format!(
            "Name and IPI number are required (got name '{}', number '{}')",
            bad.name, bad.ipi_number
        )));
    }

    let now = Utc::now();
    let created_at = storage_timestamp(&now);
    let mut saved = Vec::new();

    let mut tx = pool.begin().await?;
    for item in dedupe_selection(items) {
        let record = SavedRecord {
            id: Uuid::new_v4().to_string(),
            name: item.name.trim().to_string(),
            ipi_number: item.ipi_number.trim().to_string(),
            category: item.category,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO saved_records (id, name, ipi_number, type, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.ipi_number)
        .bind(record.category.as_str())
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        saved.push(record);
    }
    tx.commit().await?;

    tracing::info!(count = saved.len(), "Saved records inserted");
    Ok(saved)
}

/// Remove records by id; unknown ids are ignored. Returns rows removed.
pub async fn delete(pool: &SqlitePool, ids: &[String]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut query: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("DELETE FROM saved_records WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");

    let removed = query.build().execute(pool).await?.rows_affected();

    tracing::info!(requested = ids.len(), removed, "Saved records deleted");
    Ok(removed)
}
