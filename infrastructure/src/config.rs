use crate::errors::ConfigError;
use domain::models::EmbeddingMode;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const API_KEY_VAR: &str = "PINECONE_API";

/// Records per upsert when the index embeds text itself.
pub const MAX_RECORDS_PER_UPSERT: usize = 96;
/// Vectors per upsert for dense indexes.
pub const MAX_VECTORS_PER_UPSERT: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub control_url: String,
    /// Data-plane host; resolved from the control plane when unset.
    pub index_host: Option<String>,
    pub index_name: String,
    pub namespace: String,
    pub mode: EmbeddingMode,
    pub embed_model: String,
    pub text_field: String,
    pub dimension: usize,
    pub top_k: usize,
    pub batch_size: usize,
    pub cloud: String,
    pub region: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;

        let mode = match get("QA_EMBEDDING_MODE") {
            Some(raw) => EmbeddingMode::from_str(&raw).map_err(|message| {
                ConfigError::InvalidValue {
                    key: "QA_EMBEDDING_MODE",
                    message,
                }
            })?,
            None => EmbeddingMode::default(),
        };

        let upsert_limit = match mode {
            EmbeddingMode::Integrated => MAX_RECORDS_PER_UPSERT,
            EmbeddingMode::Client => MAX_VECTORS_PER_UPSERT,
        };
        let default_batch = match mode {
            EmbeddingMode::Integrated => MAX_RECORDS_PER_UPSERT,
            EmbeddingMode::Client => 100,
        };

        let dimension = parse_positive(&get, "QA_DIMENSION")?.unwrap_or(mode.default_dimension());
        let top_k = parse_positive(&get, "QA_TOP_K")?.unwrap_or(5);
        let batch_size = parse_positive(&get, "QA_BATCH_SIZE")?
            .unwrap_or(default_batch)
            .min(upsert_limit);

        Ok(Self {
            api_key,
            control_url: get("PINECONE_CONTROL_URL")
                .unwrap_or_else(|| "https://api.pinecone.io".to_string()),
            index_host: get("PINECONE_INDEX_HOST"),
            index_name: get("QA_INDEX_NAME").unwrap_or_else(|| "quora-simple-semantic".to_string()),
            namespace: get("QA_NAMESPACE").unwrap_or_else(|| "__default__".to_string()),
            mode,
            embed_model: get("QA_EMBED_MODEL").unwrap_or_else(|| "llama-text-embed-v2".to_string()),
            text_field: get("QA_TEXT_FIELD").unwrap_or_else(|| "question_text".to_string()),
            dimension,
            top_k,
            batch_size,
            cloud: get("QA_CLOUD").unwrap_or_else(|| "aws".to_string()),
            region: get("QA_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            ollama_model: get("OLLAMA_EMBED_MODEL").unwrap_or_else(|| "all-minilm".to_string()),
        })
    }
}

fn parse_positive<G>(get: &G, key: &'static str) -> Result<Option<usize>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            message: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(ConfigError::InvalidValue {
            key,
            message: format!("'{}' is not a number: {}", raw, err),
        }),
    }
}
