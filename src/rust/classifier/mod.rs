mod analyzer;
mod error;
mod model;
mod utils;
mod vectorizer;

pub use analyzer::{Analysis, SentimentAnalyzer};
pub use error::ClassifierError;
pub use model::{Classifier, OnnxClassifier, Prediction};
pub use utils::normalize_distribution;
pub use vectorizer::{Features, TokenizerVectorizer, Vectorizer};
