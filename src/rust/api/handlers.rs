use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use log::{info, warn};
use sqlx::Connection;

use super::error::ApiError;
use super::extract::{DbSession, ValidatedJson};
use super::schemas::{HealthResponse, HistoryEntry, SentimentRequest, SentimentResponse};
use super::AppState;
use crate::db::{AnalysisRepository, CreateAnalysis, HISTORY_LIMIT};

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::for_model_state(state.is_model_loaded()))
}

/// Classifies the text and records the analysis.
///
/// Without a loaded model the fixed degraded answer is returned and nothing
/// is stored.
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SentimentRequest>,
) -> Result<Json<SentimentResponse>, ApiError> {
    let Some(analyzer) = state.analyzer.as_ref().map(Arc::clone) else {
        warn!("Model not loaded; answering with the degraded response");
        return Ok(Json(SentimentResponse::degraded()));
    };

    let text = request.texto;
    let input = text.clone();
    let analysis = tokio::task::spawn_blocking(move || analyzer.analyze(&input)).await??;

    let mut session = DbSession::acquire(&state.pool).await?;
    let mut tx = session.begin().await?;
    let record = AnalysisRepository::create(
        &mut tx,
        CreateAnalysis {
            text,
            sentiment: analysis.label.clone(),
            confidence: analysis.confidence,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        "Stored analysis {} ({}, confidence {:.3})",
        record.id, record.sentiment, record.confidence
    );

    Ok(Json(SentimentResponse {
        sentimento: analysis.label,
        confianca: analysis.confidence,
    }))
}

/// Returns the most recent analyses, newest first.
pub async fn recent_history(mut session: DbSession) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let records = AnalysisRepository::list_recent(&mut session, HISTORY_LIMIT).await?;
    Ok(Json(records.into_iter().map(HistoryEntry::from).collect()))
}
