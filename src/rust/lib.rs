//! Sentiment analysis over HTTP, backed by a pre-trained model and a history of analyses.
//!
//! The model is two artifacts loaded once at startup: a [`Vectorizer`] that
//! turns text into [`Features`] and a [`Classifier`] that turns features into
//! a label and a probability per label. Both are injected into the HTTP
//! layer through [`api::AppState`]; if loading fails the service still
//! starts and answers in degraded mode.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use sentimento::{Classifier, ClassifierError, Features, Prediction, SentimentAnalyzer, Vectorizer};
//!
//! struct Exclamations;
//!
//! impl Vectorizer for Exclamations {
//!     fn transform(&self, text: &str) -> Result<Features, ClassifierError> {
//!         Ok(Features::new(vec![text.matches('!').count() as i64]))
//!     }
//! }
//!
//! struct Excited {
//!     labels: Vec<String>,
//! }
//!
//! impl Classifier for Excited {
//!     fn labels(&self) -> &[String] {
//!         &self.labels
//!     }
//!
//!     fn predict(&self, features: &Features) -> Result<Prediction, ClassifierError> {
//!         let scores: [f32; 2] = if features.input_ids[0] > 0 { [0.1, 0.9] } else { [0.6, 0.4] };
//!         Prediction::from_scores(&self.labels, &scores)
//!     }
//! }
//!
//! let analyzer = SentimentAnalyzer::new(
//!     Arc::new(Exclamations),
//!     Arc::new(Excited { labels: vec!["neutro".into(), "positivo".into()] }),
//! );
//!
//! let analysis = analyzer.analyze("Que produto maravilhoso!")?;
//! assert_eq!(analysis.label, "positivo");
//! assert_eq!(analysis.confidence, f64::from(0.9f32));
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use sentimento::{api, db, ModelManager};
//!
//! let analyzer = ModelManager::new_default().load_or_degrade();
//! let pool = db::create_pool("sqlite://analises.db", 5).await?;
//! db::run_migrations(&pool).await?;
//! api::serve(api::AppState::new(analyzer, pool), "0.0.0.0:8000".parse()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod model_manager;
mod runtime;

pub use api::AppState;
pub use classifier::{
    Analysis, Classifier, ClassifierError, Features, OnnxClassifier, Prediction, SentimentAnalyzer,
    TokenizerVectorizer, Vectorizer,
};
pub use config::Args;
pub use model_manager::{ArtifactConfig, ModelError, ModelManager};
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
