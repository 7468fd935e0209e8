use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A question as stored in the remote index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub text: String,
    /// Precomputed embedding; only used when the caller supplies vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f32>>,
}

impl QuestionRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            values: None,
        }
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        self.values = Some(values);
        self
    }
}

/// One ranked match returned for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredQuestion {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
}

impl ScoredQuestion {
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or("Text not available")
    }
}

/// Where embeddings are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingMode {
    /// The index embeds raw text with its hosted model.
    #[default]
    Integrated,
    /// Vectors are computed locally and sent alongside each record.
    Client,
}

impl EmbeddingMode {
    pub fn default_dimension(self) -> usize {
        match self {
            // llama-text-embed-v2
            EmbeddingMode::Integrated => 1024,
            // all-MiniLM-L6-v2
            EmbeddingMode::Client => 384,
        }
    }
}

impl fmt::Display for EmbeddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingMode::Integrated => f.write_str("integrated"),
            EmbeddingMode::Client => f.write_str("client"),
        }
    }
}

impl FromStr for EmbeddingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integrated" | "server" => Ok(EmbeddingMode::Integrated),
            "client" | "local" => Ok(EmbeddingMode::Client),
            other => Err(format!(
                "unknown embedding mode '{}' (expected 'integrated' or 'client')",
                other
            )),
        }
    }
}

/// Summary of the remote index contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub dimension: Option<usize>,
    pub total_vector_count: u64,
}
