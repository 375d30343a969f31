use std::collections::HashMap;
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::utils::{argmax, normalize_distribution};
use super::vectorizer::Features;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Label and probability distribution produced by a [`Classifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The most probable label
    pub label: String,
    /// Probability per known label, summing to 1
    pub probabilities: HashMap<String, f32>,
}

impl Prediction {
    /// Pairs an output vector with its labels and picks the most probable one.
    ///
    /// `scores` may be probabilities or logits; logits are normalised first.
    ///
    /// # Errors
    /// - `PredictionError` if the output length does not match the label count
    pub fn from_scores(labels: &[String], scores: &[f32]) -> Result<Self, ClassifierError> {
        if scores.len() != labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Classifier produced {} scores for {} labels",
                scores.len(),
                labels.len()
            )));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::PredictionError("Classifier produced a non-finite score".into()));
        }

        let probabilities = normalize_distribution(&Array1::from(scores.to_vec()));
        let (best, _) = argmax(&probabilities)
            .ok_or_else(|| ClassifierError::PredictionError("Classifier produced no scores".into()))?;

        Ok(Self {
            label: labels[best].clone(),
            probabilities: labels.iter().cloned().zip(probabilities.iter().copied()).collect(),
        })
    }

    /// The maximum entry of the distribution.
    pub fn confidence(&self) -> f32 {
        self.probabilities.values().copied().fold(0.0, f32::max)
    }
}

/// Second half of the model: turns [`Features`] into a [`Prediction`].
pub trait Classifier: Send + Sync {
    /// Labels in the order of the classifier's output vector.
    fn labels(&self) -> &[String];

    fn predict(&self, features: &Features) -> Result<Prediction, ClassifierError>;
}

/// Classifier backed by an ONNX sequence-classification graph.
///
/// The graph is expected to:
/// - Accept `input_ids` and `attention_mask`, both `[1, sequence_length]` i64
/// - Emit one output of shape `[1, n_labels]` holding probabilities or logits
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    labels: Vec<String>,
}

impl OnnxClassifier {
    /// Loads the ONNX artifact and checks its input/output structure.
    pub fn from_file(
        path: impl AsRef<Path>,
        labels: Vec<String>,
        runtime_config: &RuntimeConfig,
    ) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if labels.is_empty() {
            return Err(ClassifierError::BuildError("At least one label is required".into()));
        }

        let session = create_session_builder(runtime_config)?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::BuildError(format!("Failed to load classifier: {}", e)))?;

        Self::validate_model(&session)?;
        info!("Classifier loaded from {:?} with labels {:?}", path, labels);

        Ok(Self { session, labels })
    }

    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        let inputs = &session.inputs;
        if inputs.len() < 2 {
            return Err(ClassifierError::ModelError(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                inputs.len()
            )));
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for class scores".to_string(),
            ));
        }

        Ok(())
    }
}

impl Classifier for OnnxClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, features: &Features) -> Result<Prediction, ClassifierError> {
        if features.is_empty() {
            return Err(ClassifierError::ValidationError("Features cannot be empty".into()));
        }

        let input_ids = Array2::from_shape_vec((1, features.len()), features.input_ids.clone())
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input array: {}", e)))?;
        let attention_mask = Array2::from_shape_vec((1, features.attention_mask.len()), features.attention_mask.clone())
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create mask array: {}", e)))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert("input_ids", Tensor::from_array(input_ids)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);
        input_tensors.insert("attention_mask", Tensor::from_array(attention_mask)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create mask tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        let scores: Vec<f32> = output_tensor.iter().copied().collect();
        Prediction::from_scores(&self.labels, &scores)
    }
}
