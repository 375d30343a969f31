use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, OnnxClassifier, SentimentAnalyzer, TokenizerVectorizer};
use crate::runtime::RuntimeConfig;

pub const DEFAULT_MODEL_FILE: &str = "modelo.onnx";
pub const DEFAULT_VECTORIZER_FILE: &str = "vetorizador.json";
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 256;
/// Width of the `sentimento` column; longer labels could not be persisted.
pub const MAX_LABEL_LENGTH: usize = 50;

pub fn default_labels() -> Vec<String> {
    vec!["negativo".into(), "neutro".into(), "positivo".into()]
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid label set: {0}")]
    InvalidLabels(String),
    #[error("Failed to load {file_type}: {source}")]
    Load {
        file_type: String,
        source: ClassifierError,
    },
}

/// Where the two artifacts live and how to turn them into a [`SentimentAnalyzer`].
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Base directory relative artifact paths are resolved against
    pub install_root: PathBuf,
    pub model_file: PathBuf,
    pub vectorizer_file: PathBuf,
    /// Expected lowercase hex SHA-256 of the classifier, if it should be verified
    pub model_sha256: Option<String>,
    pub vectorizer_sha256: Option<String>,
    /// Labels in the order of the classifier's output vector
    pub labels: Vec<String>,
    pub max_sequence_length: usize,
    pub runtime: RuntimeConfig,
}

impl ArtifactConfig {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            model_file: PathBuf::from(DEFAULT_MODEL_FILE),
            vectorizer_file: PathBuf::from(DEFAULT_VECTORIZER_FILE),
            model_sha256: None,
            vectorizer_sha256: None,
            labels: default_labels(),
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new(ModelManager::get_default_install_root())
    }
}

#[derive(Debug, Clone)]
pub struct ModelManager {
    config: ArtifactConfig,
}

impl ModelManager {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    /// Creates a ModelManager with default artifact names under the default install root
    pub fn new_default() -> Self {
        Self::new(ArtifactConfig::default())
    }

    /// Returns the directory the artifacts are looked up in when none is configured.
    ///
    /// A binary installed as `<root>/bin/sentimento` resolves to `<root>`; any
    /// other executable location resolves to the executable's own directory.
    /// Falls back to the working directory if the executable path is unknown.
    pub fn get_default_install_root() -> PathBuf {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match exe_dir {
            Some(dir) if dir.file_name().is_some_and(|name| name == "bin") => {
                dir.parent().map(Path::to_path_buf).unwrap_or(dir)
            }
            Some(dir) => dir,
            None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.config.install_root.join(file)
        }
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.resolve(&self.config.model_file)
    }

    pub fn get_vectorizer_path(&self) -> PathBuf {
        self.resolve(&self.config.vectorizer_file)
    }

    fn verify_file(&self, path: &Path, expected_hash: &str, file_type: &str) -> Result<(), ModelError> {
        log::info!("Verifying {} file: {:?}", file_type, path);
        let actual = sha256_file(path)?;
        let expected = expected_hash.trim().to_ascii_lowercase();
        if actual != expected {
            log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
            return Err(ModelError::HashMismatch {
                file_type: file_type.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Checks both artifacts exist and, when checksums are configured, match them.
    pub fn verify_model(&self) -> Result<(), ModelError> {
        let model_path = self.get_model_path();
        let vectorizer_path = self.get_vectorizer_path();

        for path in [&model_path, &vectorizer_path] {
            if !path.exists() {
                return Err(ModelError::NotFound(path.display().to_string()));
            }
        }
        if let Some(expected) = &self.config.model_sha256 {
            self.verify_file(&model_path, expected, "model")?;
        }
        if let Some(expected) = &self.config.vectorizer_sha256 {
            self.verify_file(&vectorizer_path, expected, "vectorizer")?;
        }
        Ok(())
    }

    fn validate_labels(labels: &[String]) -> Result<(), ModelError> {
        if labels.is_empty() {
            return Err(ModelError::InvalidLabels("at least one label is required".into()));
        }
        for (i, label) in labels.iter().enumerate() {
            if label.is_empty() {
                return Err(ModelError::InvalidLabels(format!("label {} is empty", i + 1)));
            }
            if label.chars().count() > MAX_LABEL_LENGTH {
                return Err(ModelError::InvalidLabels(format!(
                    "label '{}' is longer than {} characters",
                    label, MAX_LABEL_LENGTH
                )));
            }
            if labels[..i].contains(label) {
                return Err(ModelError::InvalidLabels(format!("duplicate label '{}'", label)));
            }
        }
        Ok(())
    }

    /// Loads the vectorizer and classifier artifacts.
    pub fn load(&self) -> Result<SentimentAnalyzer, ModelError> {
        Self::validate_labels(&self.config.labels)?;
        self.verify_model()?;

        let vectorizer = TokenizerVectorizer::from_file(self.get_vectorizer_path(), self.config.max_sequence_length)
            .map_err(|source| ModelError::Load {
                file_type: "vectorizer".to_string(),
                source,
            })?;
        let classifier = OnnxClassifier::from_file(
            self.get_model_path(),
            self.config.labels.clone(),
            &self.config.runtime,
        )
        .map_err(|source| ModelError::Load {
            file_type: "model".to_string(),
            source,
        })?;

        Ok(SentimentAnalyzer::new(Arc::new(vectorizer), Arc::new(classifier)))
    }

    /// Loads the artifacts, or logs why it could not and returns `None` so the
    /// service can start in degraded mode.
    pub fn load_or_degrade(&self) -> Option<Arc<SentimentAnalyzer>> {
        match self.load() {
            Ok(analyzer) => {
                log::info!("Model and vectorizer loaded successfully (labels: {:?})", analyzer.labels());
                Some(Arc::new(analyzer))
            }
            Err(e) => {
                log::error!(
                    "Could not load model artifacts from {:?} and {:?}: {}",
                    self.get_model_path(),
                    self.get_vectorizer_path(),
                    e
                );
                log::warn!("Serving in degraded mode; analyses will not be persisted");
                None
            }
        }
    }
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String, io::Error> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
