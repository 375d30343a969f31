use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::model_manager::{
    ArtifactConfig, ModelManager, DEFAULT_MAX_SEQUENCE_LENGTH, DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE,
};
use crate::runtime::{OptimizationLevel, RuntimeConfig};

/// Sentiment analysis API.
///
/// Every option can also be set through the environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database connection string, e.g. `sqlite://analises.db`
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Address the HTTP server binds to
    #[arg(long, env = "SENTIMENTO_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Maximum number of pooled database connections
    #[arg(long, env = "SENTIMENTO_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Directory relative artifact paths are resolved against [default: installation root]
    #[arg(long, env = "SENTIMENTO_HOME")]
    pub install_root: Option<PathBuf>,

    /// Classifier artifact (ONNX)
    #[arg(long, env = "SENTIMENTO_MODEL_FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model_file: PathBuf,

    /// Vectorizer artifact (tokenizer.json)
    #[arg(long, env = "SENTIMENTO_VECTORIZER_FILE", default_value = DEFAULT_VECTORIZER_FILE)]
    pub vectorizer_file: PathBuf,

    /// Expected SHA-256 of the classifier artifact
    #[arg(long, env = "SENTIMENTO_MODEL_SHA256")]
    pub model_sha256: Option<String>,

    /// Expected SHA-256 of the vectorizer artifact
    #[arg(long, env = "SENTIMENTO_VECTORIZER_SHA256")]
    pub vectorizer_sha256: Option<String>,

    /// Labels in the order of the classifier's outputs
    #[arg(
        long,
        env = "SENTIMENTO_LABELS",
        value_delimiter = ',',
        default_value = "negativo,neutro,positivo"
    )]
    pub labels: Vec<String>,

    /// Longest token sequence the classifier accepts
    #[arg(long, env = "SENTIMENTO_MAX_SEQUENCE_LENGTH", default_value_t = DEFAULT_MAX_SEQUENCE_LENGTH)]
    pub max_sequence_length: usize,

    /// ONNX Runtime inter-op threads (0 = runtime default)
    #[arg(long, env = "SENTIMENTO_INTER_THREADS", default_value_t = 0)]
    pub inter_threads: usize,

    /// ONNX Runtime intra-op threads (0 = runtime default)
    #[arg(long, env = "SENTIMENTO_INTRA_THREADS", default_value_t = 0)]
    pub intra_threads: usize,

    /// ONNX Runtime graph optimization level
    #[arg(long, env = "SENTIMENTO_OPTIMIZATION", value_enum, default_value_t = OptimizationLevel::All)]
    pub optimization: OptimizationLevel,
}

impl Args {
    pub fn artifact_config(&self) -> ArtifactConfig {
        let install_root = self
            .install_root
            .clone()
            .unwrap_or_else(ModelManager::get_default_install_root);

        ArtifactConfig {
            install_root,
            model_file: self.model_file.clone(),
            vectorizer_file: self.vectorizer_file.clone(),
            model_sha256: self.model_sha256.clone(),
            vectorizer_sha256: self.vectorizer_sha256.clone(),
            labels: self.labels.iter().map(|l| l.trim().to_string()).collect(),
            max_sequence_length: self.max_sequence_length,
            runtime: RuntimeConfig {
                inter_threads: self.inter_threads,
                intra_threads: self.intra_threads,
                optimization_level: self.optimization,
            },
        }
    }
}
