//! Row types for the `analises` table.

use chrono::NaiveDateTime;

/// A persisted analysis. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AnalysisRecord {
    pub id: i64,
    #[sqlx(rename = "texto")]
    pub text: String,
    #[sqlx(rename = "sentimento")]
    pub sentiment: String,
    #[sqlx(rename = "confianca")]
    pub confidence: f64,
    /// Assigned by the database on insert (UTC)
    #[sqlx(rename = "data_analise")]
    pub created_at: NaiveDateTime,
}

/// Input for creating a new analysis record.
#[derive(Debug, Clone)]
pub struct CreateAnalysis {
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
}
