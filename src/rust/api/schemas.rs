//! Request and response contracts of the HTTP API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::AnalysisRecord;

/// Maximum length of `texto`, matching the `analises.texto` column.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Label returned when the model is not loaded.
pub const DEGRADED_LABEL: &str = "erro";

pub const STATUS_MODEL_LOADED: &str = "API esta no ar e o modelo parece estar carregado";
pub const STATUS_MODEL_MISSING: &str = "API esta no ar, mas o modelo nao pode ser carregado.";

/// One segment of the location of a validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for LocItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single entry of a `422` response's `detail` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<LocItem>,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl FieldError {
    pub fn new(
        kind: &str,
        loc: impl IntoIterator<Item = LocItem>,
        msg: impl Into<String>,
        input: Option<Value>,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            loc: loc.into_iter().collect(),
            msg: msg.into(),
            input,
        }
    }

    pub fn missing(loc: impl IntoIterator<Item = LocItem>, input: Option<Value>) -> Self {
        Self::new("missing", loc, "Field required", input)
    }
}

fn body_field(name: &str) -> [LocItem; 2] {
    ["body".into(), name.into()]
}

/// Types that can be built from an already-parsed JSON request body.
pub trait Schema: Sized {
    fn from_value(value: Value) -> Result<Self, Vec<FieldError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRequest {
    pub texto: String,
}

impl SentimentRequest {
    fn validate_texto(texto: Value) -> Result<String, FieldError> {
        let loc = body_field("texto");
        let texto = match texto {
            Value::String(texto) => texto,
            other => {
                return Err(FieldError::new("string_type", loc, "Input should be a valid string", Some(other)))
            }
        };

        let length = texto.chars().count();
        if length > MAX_TEXT_LENGTH {
            return Err(FieldError::new(
                "string_too_long",
                loc,
                format!("String should have at most {} characters", MAX_TEXT_LENGTH),
                Some(Value::String(texto)),
            ));
        }
        Ok(texto)
    }
}

impl Schema for SentimentRequest {
    fn from_value(value: Value) -> Result<Self, Vec<FieldError>> {
        let mut body = match value {
            Value::Object(body) => body,
            other => {
                return Err(vec![FieldError::new(
                    "model_attributes_type",
                    [LocItem::from("body")],
                    "Input should be a valid dictionary or object to extract fields from",
                    Some(other),
                )])
            }
        };

        match body.remove("texto") {
            None => Err(vec![FieldError::missing(body_field("texto"), Some(Value::Object(body)))]),
            Some(texto) => Self::validate_texto(texto)
                .map(|texto| Self { texto })
                .map_err(|e| vec![e]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub sentimento: String,
    pub confianca: f64,
}

impl SentimentResponse {
    /// Fixed answer given while the model artifacts are absent.
    pub fn degraded() -> Self {
        Self {
            sentimento: DEGRADED_LABEL.to_string(),
            confianca: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub texto: String,
    pub sentimento: String,
    pub confianca: f64,
    pub data_analise: NaiveDateTime,
}

impl From<AnalysisRecord> for HistoryEntry {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            id: record.id,
            texto: record.text,
            sentimento: record.sentiment,
            confianca: record.confidence,
            data_analise: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn for_model_state(model_loaded: bool) -> Self {
        let status = if model_loaded { STATUS_MODEL_LOADED } else { STATUS_MODEL_MISSING };
        Self { status: status.to_string() }
    }
}
