#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokenizers::Tokenizer;
use tower::ServiceExt;

use sentimento::{
    api, Classifier, ClassifierError, Features, Prediction, SentimentAnalyzer, TokenizerVectorizer, Vectorizer,
};

pub const LABELS: [&str; 3] = ["negativo", "neutro", "positivo"];

const POSITIVE_WORDS: &[&str] = &["maravilhoso", "recomendo", "excelente", "rápida"];
const NEGATIVE_WORDS: &[&str] = &["odeio", "péssima", "quebrado", "ruim"];

/// Scores text by counting sentiment-bearing words: `[positives, negatives]`.
pub struct KeywordVectorizer;

impl Vectorizer for KeywordVectorizer {
    fn transform(&self, text: &str) -> Result<Features, ClassifierError> {
        let lower = text.to_lowercase();
        let count = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count() as i64;
        Ok(Features::new(vec![count(POSITIVE_WORDS), count(NEGATIVE_WORDS)]))
    }
}

/// Returns logits favouring whichever side has more keywords.
pub struct KeywordClassifier {
    labels: Vec<String>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self { labels: LABELS.iter().map(|l| l.to_string()).collect() }
    }
}

impl Classifier for KeywordClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, features: &Features) -> Result<Prediction, ClassifierError> {
        let balance = (features.input_ids[0] - features.input_ids[1]) as f32;
        Prediction::from_scores(&self.labels, &[-balance, 0.5, balance])
    }
}

/// Vectorizer that rejects every input the way a too-short token window would.
pub struct RejectingVectorizer;

impl Vectorizer for RejectingVectorizer {
    fn transform(&self, _text: &str) -> Result<Features, ClassifierError> {
        Err(ClassifierError::ValidationError("Input text too long: 999 tokens (max: 256)".into()))
    }
}

/// Classifier whose graph output does not match its labels.
pub struct BrokenClassifier {
    labels: Vec<String>,
}

impl Classifier for BrokenClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, _features: &Features) -> Result<Prediction, ClassifierError> {
        Prediction::from_scores(&self.labels, &[0.5, 0.5])
    }
}

/// Window of the tokenizer-backed test analyzer.
pub const TOKEN_WINDOW: usize = 16;

const WORD_LEVEL_TOKENIZER: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": { "type": "Lowercase" },
    "pre_tokenizer": { "type": "Whitespace" },
    "post_processor": null,
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": { "[UNK]": 0, "bom": 1, "ruim": 2, "!": 3 },
        "unk_token": "[UNK]"
    }
}"#;

/// Fails like a fixed-size graph would when fed more tokens than its window.
pub struct WindowClassifier {
    labels: Vec<String>,
}

impl Classifier for WindowClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, features: &Features) -> Result<Prediction, ClassifierError> {
        if features.is_empty() || features.len() > TOKEN_WINDOW {
            return Err(ClassifierError::PredictionError(format!(
                "expected 1..={} tokens, got {}",
                TOKEN_WINDOW,
                features.len()
            )));
        }
        let good = features.input_ids.iter().filter(|&&id| id == 1).count() as f32;
        let bad = features.input_ids.iter().filter(|&&id| id == 2).count() as f32;
        Prediction::from_scores(&self.labels, &[bad, 0.5, good])
    }
}

pub fn tokenizer_analyzer() -> Arc<SentimentAnalyzer> {
    let tokenizer = Tokenizer::from_str(WORD_LEVEL_TOKENIZER).expect("valid tokenizer json");
    let vectorizer = TokenizerVectorizer::new(tokenizer, TOKEN_WINDOW).expect("positive window");
    let labels = LABELS.iter().map(|l| l.to_string()).collect();
    Arc::new(SentimentAnalyzer::new(Arc::new(vectorizer), Arc::new(WindowClassifier { labels })))
}

pub fn keyword_analyzer() -> Arc<SentimentAnalyzer> {
    Arc::new(SentimentAnalyzer::new(Arc::new(KeywordVectorizer), Arc::new(KeywordClassifier::new())))
}

pub fn rejecting_analyzer() -> Arc<SentimentAnalyzer> {
    Arc::new(SentimentAnalyzer::new(Arc::new(RejectingVectorizer), Arc::new(KeywordClassifier::new())))
}

pub fn broken_analyzer() -> Arc<SentimentAnalyzer> {
    let labels = LABELS.iter().map(|l| l.to_string()).collect();
    Arc::new(SentimentAnalyzer::new(Arc::new(KeywordVectorizer), Arc::new(BrokenClassifier { labels })))
}

/// Single-connection in-memory database so every request sees the same data.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sentimento::db::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn app_with(analyzer: Option<Arc<SentimentAnalyzer>>) -> (Router, SqlitePool) {
    let pool = memory_pool().await;
    let router = api::router(api::AppState::new(analyzer, pool.clone()));
    (router, pool)
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body.to_string())).await
}

pub async fn post_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body.to_string())).await
}
