use super::ollama_client::OllamaClient;
use domain::models::QuestionRecord;
use futures::stream::{self, StreamExt};
use shared::types::Result;
use tracing::debug;

const BATCH_SIZE: usize = 32;
const CONCURRENCY: usize = 8;

#[derive(Clone)]
pub struct Embedder {
    client: OllamaClient,
}

impl Embedder {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.client.generate_embedding(text).await
    }

    /// Fill in `values` for every record that has none. Records that
    /// already carry a vector are left untouched.
    pub async fn embed_missing(&self, records: &mut [QuestionRecord]) -> Result<()> {
        let pending: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.values.is_none())
            .map(|(i, _)| i)
            .collect();

        for chunk in pending.chunks(BATCH_SIZE) {
            debug!(count = chunk.len(), model = self.client.model(), "embedding records");
            let requests: Vec<_> = chunk
                .iter()
                .map(|&i| {
                    let client = self.client.clone();
                    let text = records[i].text.clone();
                    async move { client.generate_embedding(&text).await }
                })
                .collect();
            let vectors = stream::iter(requests)
                .buffered(CONCURRENCY)
                .collect::<Vec<_>>()
                .await;

            for (&i, vector) in chunk.iter().zip(vectors) {
                records[i].values = Some(vector?);
            }
        }
        Ok(())
    }
}
