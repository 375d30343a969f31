//! Repository functions for database operations.

use sqlx::SqliteConnection;

use crate::db::models::{AnalysisRecord, CreateAnalysis};

/// Number of records the history endpoint returns.
pub const HISTORY_LIMIT: i64 = 10;

/// Repository for analysis operations.
///
/// Functions take the connection explicitly so callers decide the scope of
/// the session (a pooled connection or a transaction).
pub struct AnalysisRepository;

impl AnalysisRepository {
    /// Inserts a new analysis and returns it with the generated id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(
        conn: &mut SqliteConnection,
        input: CreateAnalysis,
    ) -> Result<AnalysisRecord, sqlx::Error> {
        sqlx::query_as::<_, AnalysisRecord>(
            r#"
            INSERT INTO analises (texto, sentimento, confianca)
            VALUES (?1, ?2, ?3)
            RETURNING id, texto, sentimento, confianca, data_analise
            "#,
        )
        .bind(input.text)
        .bind(input.sentiment)
        .bind(input.confidence)
        .fetch_one(&mut *conn)
        .await
    }

    /// Lists the most recent analyses, newest first.
    ///
    /// Records sharing a timestamp are ordered by descending id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_recent(
        conn: &mut SqliteConnection,
        limit: i64,
    ) -> Result<Vec<AnalysisRecord>, sqlx::Error> {
        sqlx::query_as::<_, AnalysisRecord>(
            r#"
            SELECT id, texto, sentimento, confianca, data_analise
            FROM analises
            ORDER BY data_analise DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
    }

    /// Counts all stored analyses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analises")
            .fetch_one(&mut *conn)
            .await
    }
}
