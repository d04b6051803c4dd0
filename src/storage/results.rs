//! Analysis result persistence.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::analysis::AnalysisResult;
use crate::error_handling::DatabaseError;

/// Append-only store of analysis results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Appends `result` as a new record and returns its id. Never updates or
    /// deletes earlier records for the same URL.
    async fn persist(&self, result: &AnalysisResult) -> Result<i64, DatabaseError>;

    /// Most recent records first.
    async fn list(&self, limit: i64) -> Result<Vec<AnalysisRecord>, DatabaseError>;

    /// All records for `url`, most recent first.
    async fn history(&self, url: &str, limit: i64) -> Result<Vec<AnalysisRecord>, DatabaseError>;

    /// Releases the store's connections.
    async fn close(&self) {}
}

/// One persisted row of `url_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub score: f64,
    pub label: String,
    pub status: String,
    pub threat_level: String,
    pub risk_score: i64,
    pub scoring_policy: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip)]
    result_json: String,
}

impl AnalysisRecord {
    /// Decodes the full result stored with this record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SerializationError` if the stored JSON is not a
    /// valid `AnalysisResult`.
    pub fn result(&self) -> Result<AnalysisResult, DatabaseError> {
        Ok(serde_json::from_str(&self.result_json)?)
    }
}

/// `ResultStore` over the `url_analysis` table.
#[derive(Clone)]
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, url, title, summary, score, label, status, threat_level,
        risk_score, scoring_policy, analyzed_at, result_json
 FROM url_analysis";

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn persist(&self, result: &AnalysisResult) -> Result<i64, DatabaseError> {
        let summary = result.summary();
        let result_json = serde_json::to_string(result)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO url_analysis (
                url, title, summary, score, label, status, threat_level,
                risk_score, scoring_policy, result_json, analyzed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id",
        )
        .bind(&result.url)
        .bind(&summary.title)
        .bind(&summary.summary)
        .bind(summary.score)
        .bind(&summary.label)
        .bind(result.status.as_str())
        .bind(result.threat_level.as_str())
        .bind(i64::from(result.risk_score))
        .bind(&result.scoring_policy)
        .bind(&result_json)
        .bind(result.timestamp.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self, limit: i64) -> Result<Vec<AnalysisRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY analyzed_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn history(&self, url: &str, limit: i64) -> Result<Vec<AnalysisRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE url = ? ORDER BY analyzed_at DESC, id DESC LIMIT ?"
        ))
        .bind(url)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> AnalysisRecord {
    let analyzed_at_ms: i64 = row.get("analyzed_at");
    AnalysisRecord {
        id: row.get("id"),
        url: row.get("url"),
        title: row.get("title"),
        summary: row.get("summary"),
        score: row.get("score"),
        label: row.get("label"),
        status: row.get("status"),
        threat_level: row.get("threat_level"),
        risk_score: row.get("risk_score"),
        scoring_policy: row.get("scoring_policy"),
        analyzed_at: Utc
            .timestamp_millis_opt(analyzed_at_ms)
            .single()
            .unwrap_or_default(),
        result_json: row.get("result_json"),
    }
}
