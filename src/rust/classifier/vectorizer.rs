use std::path::Path;

use log::{debug, error, info};
use tokenizers::{Tokenizer, TruncationParams};

use super::error::ClassifierError;

/// Numerical representation of a single text, in the layout the classifier graph consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// Token ids, shape `[sequence_length]`
    pub input_ids: Vec<i64>,
    /// 1 for real tokens, 0 for padding, same length as `input_ids`
    pub attention_mask: Vec<i64>,
}

impl Features {
    /// Builds features with every position attended.
    pub fn new(input_ids: Vec<i64>) -> Self {
        let attention_mask = vec![1; input_ids.len()];
        Self { input_ids, attention_mask }
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// First half of the model: turns raw text into [`Features`].
///
/// Implementations are shared across request handlers, so they must be
/// `Send + Sync` and must not mutate themselves while transforming.
pub trait Vectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<Features, ClassifierError>;
}

/// Token strings tried, in order, when an empty encoding needs a placeholder id.
const PLACEHOLDER_TOKENS: [&str; 4] = ["[PAD]", "<pad>", "[UNK]", "<unk>"];

/// Vectorizer backed by a serialized HuggingFace `tokenizer.json`.
///
/// Encodings longer than the classifier's window are truncated, and an
/// encoding with no tokens at all becomes a single placeholder token, so
/// every string produces features.
#[derive(Debug)]
pub struct TokenizerVectorizer {
    tokenizer: Tokenizer,
    placeholder_id: u32,
}

impl TokenizerVectorizer {
    /// Wraps a tokenizer, truncating its encodings to `max_sequence_length` tokens.
    ///
    /// # Errors
    /// - `ValidationError` if `max_sequence_length` is zero
    /// - `BuildError` if the tokenizer rejects the truncation settings
    pub fn new(mut tokenizer: Tokenizer, max_sequence_length: usize) -> Result<Self, ClassifierError> {
        if max_sequence_length == 0 {
            return Err(ClassifierError::ValidationError("Max sequence length must be positive".into()));
        }
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::BuildError(format!("Failed to configure truncation: {}", e)))?;

        let placeholder_id = match tokenizer.get_padding() {
            Some(padding) => padding.pad_id,
            None => PLACEHOLDER_TOKENS
                .iter()
                .find_map(|token| tokenizer.token_to_id(token))
                .unwrap_or(0),
        };

        Ok(Self { tokenizer, placeholder_id })
    }

    /// Loads the tokenizer artifact from disk.
    ///
    /// # Errors
    /// - `BuildError` if the file cannot be read or is not a valid tokenizer definition
    /// - `ValidationError` if `max_sequence_length` is zero
    pub fn from_file(path: impl AsRef<Path>, max_sequence_length: usize) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            error!("Failed to load vectorizer from {:?}: {}", path, e);
            ClassifierError::BuildError(format!("Failed to load vectorizer: {}", e))
        })?;
        let vectorizer = Self::new(tokenizer, max_sequence_length)?;
        info!("Vectorizer loaded from {:?} (window: {} tokens)", path, max_sequence_length);
        Ok(vectorizer)
    }
}

impl Vectorizer for TokenizerVectorizer {
    /// Encodes the text into token ids and an attention mask.
    ///
    /// # Errors
    /// - `TokenizerError` if the text cannot be encoded
    fn transform(&self, text: &str) -> Result<Features, ClassifierError> {
        let encoding = self.tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;

        if encoding.get_ids().is_empty() {
            debug!("Text produced no tokens, using placeholder id {}", self.placeholder_id);
            return Ok(Features::new(vec![i64::from(self.placeholder_id)]));
        }

        let input_ids = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let attention_mask = encoding.get_attention_mask().iter().map(|&m| i64::from(m)).collect();

        Ok(Features { input_ids, attention_mask })
    }
}
