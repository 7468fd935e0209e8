use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::types::Result;
use shared::utils::normalize_base_url;
use std::sync::Arc;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Local embedding server used when the index does not embed text itself.
#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error ({}): {}", status, body));
        }
        let embedding_response: EmbeddingResponse = response.json().await?;
        if embedding_response.embedding.is_empty() {
            return Err(anyhow::anyhow!(
                "Ollama returned an empty embedding for model '{}'",
                self.model
            ));
        }
        Ok(embedding_response.embedding)
    }
}
