use crate::config::Config;
use crate::embedder::Embedder;
use crate::errors::PineconeError;
use crate::ollama_client::OllamaClient;
use crate::pinecone_client::{IndexClient, Vector};
use domain::models::{EmbeddingMode, QuestionRecord, ScoredQuestion};
use domain::ports::{QuestionSearch, RecordSink};
use serde_json::{Map, Value};
use shared::types::Result;

const SOURCE_TAG: &str = "quora";

#[derive(Clone)]
enum Backend {
    /// The index embeds text; records and queries travel as raw text.
    Integrated,
    /// Vectors are produced locally before every upsert and query.
    Client { embedder: Embedder, dimension: usize },
}

/// The remote question index, speaking whichever Pinecone API matches the
/// configured embedding mode.
#[derive(Clone)]
pub struct QuestionIndex {
    index: IndexClient,
    namespace: String,
    text_field: String,
    backend: Backend,
}

impl QuestionIndex {
    pub fn new(index: IndexClient, config: &Config) -> Self {
        let backend = match config.mode {
            EmbeddingMode::Integrated => Backend::Integrated,
            EmbeddingMode::Client => Backend::Client {
                embedder: Embedder::new(OllamaClient::new(
                    &config.ollama_base_url,
                    &config.ollama_model,
                )),
                dimension: config.dimension,
            },
        };
        Self {
            index,
            namespace: config.namespace.clone(),
            text_field: config.text_field.clone(),
            backend,
        }
    }

    pub fn client(&self) -> &IndexClient {
        &self.index
    }

    fn text_row(&self, record: &QuestionRecord) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("_id".into(), Value::String(record.id.clone()));
        row.insert(self.text_field.clone(), Value::String(record.text.clone()));
        row.insert("source".into(), Value::String(SOURCE_TAG.into()));
        row
    }

    fn vector_row(&self, record: QuestionRecord, dimension: usize) -> Result<Vector> {
        check_dimension(&record, dimension)?;
        let mut metadata = Map::new();
        metadata.insert(self.text_field.clone(), Value::String(record.text));
        metadata.insert("source".into(), Value::String(SOURCE_TAG.into()));
        Ok(Vector {
            id: record.id,
            values: record.values.unwrap_or_default(),
            metadata,
        })
    }

    fn field_text(&self, fields: Option<&Map<String, Value>>) -> Option<String> {
        fields
            .and_then(|f| f.get(&self.text_field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl QuestionSearch for QuestionIndex {
    async fn search(&self, question: &str, top_k: usize) -> Result<Vec<ScoredQuestion>> {
        match &self.backend {
            Backend::Integrated => {
                let fields = [self.text_field.clone()];
                let hits = self
                    .index
                    .search_records(&self.namespace, question, top_k, &fields)
                    .await?;
                Ok(hits
                    .into_iter()
                    .map(|hit| ScoredQuestion {
                        text: self.field_text(Some(&hit.fields)),
                        id: hit.id,
                        score: hit.score,
                    })
                    .collect())
            }
            Backend::Client { embedder, .. } => {
                let vector = embedder.embed_query(question).await?;
                let matches = self.index.query(&self.namespace, &vector, top_k).await?;
                Ok(matches
                    .into_iter()
                    .map(|m| ScoredQuestion {
                        text: self.field_text(m.metadata.as_ref()),
                        id: m.id,
                        score: m.score,
                    })
                    .collect())
            }
        }
    }
}

impl RecordSink for QuestionIndex {
    /// Client mode: reject precomputed vectors of the wrong length, then
    /// embed the records that have none.
    async fn prepare(&self, batch: &mut [QuestionRecord]) -> Result<()> {
        if let Backend::Client { embedder, dimension } = &self.backend {
            for record in batch.iter().filter(|r| r.values.is_some()) {
                check_dimension(record, *dimension)?;
            }
            embedder.embed_missing(batch).await?;
        }
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[QuestionRecord]) -> Result<usize> {
        match &self.backend {
            Backend::Integrated => {
                let rows: Vec<Map<String, Value>> = batch.iter().map(|r| self.text_row(r)).collect();
                Ok(self.index.upsert_records(&self.namespace, &rows).await?)
            }
            Backend::Client { dimension, .. } => {
                let mut records = batch.to_vec();
                self.prepare(&mut records).await?;
                let vectors = records
                    .into_iter()
                    .map(|r| self.vector_row(r, *dimension))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.index.upsert_vectors(&self.namespace, &vectors).await?)
            }
        }
    }
}

fn check_dimension(
    record: &QuestionRecord,
    dimension: usize,
) -> std::result::Result<(), PineconeError> {
    let actual = record.values.as_ref().map_or(0, Vec::len);
    if actual != dimension {
        return Err(PineconeError::DimensionMismatch {
            id: record.id.clone(),
            expected: dimension,
            actual,
        });
    }
    Ok(())
}
