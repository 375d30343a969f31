use std::fmt;
use std::sync::Arc;

use super::error::ClassifierError;
use super::model::Classifier;
use super::vectorizer::Vectorizer;

/// Outcome of one analysis: the winning label and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub label: String,
    /// Maximum of the classifier's probability vector, in [0, 1]
    pub confidence: f64,
}

/// The loaded model: a vectorizer feeding a classifier.
///
/// Cheap to clone and safe to share between request handlers; neither
/// artifact is mutated after construction.
#[derive(Clone)]
pub struct SentimentAnalyzer {
    vectorizer: Arc<dyn Vectorizer>,
    classifier: Arc<dyn Classifier>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SentimentAnalyzer>();
    }
};

impl fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("labels", &self.classifier.labels())
            .finish_non_exhaustive()
    }
}

impl SentimentAnalyzer {
    pub fn new(vectorizer: Arc<dyn Vectorizer>, classifier: Arc<dyn Classifier>) -> Self {
        Self { vectorizer, classifier }
    }

    /// Labels the classifier can produce.
    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    /// Runs the text through the vectorizer and classifier.
    ///
    /// Any string is accepted, the empty one included.
    ///
    /// # Errors
    /// Forwards all errors from the vectorizer and classifier
    pub fn analyze(&self, text: &str) -> Result<Analysis, ClassifierError> {
        let features = self.vectorizer.transform(text)?;
        let prediction = self.classifier.predict(&features)?;
        let confidence = f64::from(prediction.confidence());

        Ok(Analysis {
            label: prediction.label,
            confidence,
        })
    }
}
