use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::schemas::{FieldError, LocItem};
use crate::classifier::ClassifierError;

/// Errors a request handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request validation failed ({} errors)", .0.len())]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Body(#[from] BytesRejection),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Classifier(#[from] ClassifierError),
    #[error("Inference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal Server Error" })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                log::debug!("Rejected request body: {:?}", errors);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": errors }))).into_response()
            }
            Self::Body(rejection) => rejection.into_response(),
            Self::Classifier(ClassifierError::ValidationError(msg)) => {
                let error = FieldError::new(
                    "value_error",
                    [LocItem::from("body"), LocItem::from("texto")],
                    msg,
                    None,
                );
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": [error] }))).into_response()
            }
            Self::Database(e) => {
                log::error!("Database error: {}", e);
                internal_error()
            }
            Self::Classifier(e) => {
                log::error!("Inference failed: {}", e);
                internal_error()
            }
            Self::Task(e) => {
                log::error!("Inference task failed: {}", e);
                internal_error()
            }
        }
    }
}
