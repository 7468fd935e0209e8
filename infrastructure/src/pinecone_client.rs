//! Minimal Pinecone REST client: index management plus the record and
//! vector endpoints this tool needs.

use crate::errors::PineconeError;
use domain::models::IndexStats;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::utils::normalize_base_url;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const API_VERSION: &str = "2025-04";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
    #[serde(default)]
    pub embed: Option<EmbedDescription>,
}

impl IndexDescription {
    pub fn is_ready(&self) -> bool {
        self.status.ready && !self.host.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedDescription {
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexForModel {
    pub name: String,
    pub cloud: String,
    pub region: String,
    pub embed: EmbedSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedSpec {
    pub model: String,
    pub field_map: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIndex {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub spec: IndexSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexSpec {
    pub serverless: ServerlessSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerlessSpec {
    pub cloud: String,
    pub region: String,
}

/// A dense vector as sent to `/vectors/upsert`.
#[derive(Debug, Clone, Serialize)]
pub struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: f32,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: SearchQuery<'a>,
    fields: &'a [String],
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    inputs: SearchInputs<'a>,
    top_k: usize,
}

#[derive(Serialize)]
struct SearchInputs<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Serialize)]
struct UpsertVectorsRequest<'a> {
    vectors: &'a [Vector],
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertVectorsResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeStatsResponse {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: u64,
}

/// Control-plane client. Data-plane calls go through [`IndexClient`].
#[derive(Clone)]
pub struct PineconeClient {
    client: Arc<Client>,
    api_key: String,
    control_url: String,
}

impl PineconeClient {
    pub fn new(api_key: &str, control_url: &str) -> Result<Self, PineconeError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.to_string(),
            control_url: normalize_base_url(control_url),
        })
    }

    /// `None` when the index does not exist.
    pub async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>, PineconeError> {
        let url = format!("{}/indexes/{}", self.control_url, name);
        debug!(%url, "describe index");
        let request = authorize(self.client.get(&url), &self.api_key);
        match send(request).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(PineconeError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn create_index_for_model(
        &self,
        request: &CreateIndexForModel,
    ) -> Result<IndexDescription, PineconeError> {
        let url = format!("{}/indexes/create-for-model", self.control_url);
        debug!(%url, name = %request.name, "create index for model");
        let response = send(authorize(self.client.post(&url), &self.api_key).json(request)).await?;
        Ok(response.json().await?)
    }

    pub async fn create_index(&self, request: &CreateIndex) -> Result<IndexDescription, PineconeError> {
        let url = format!("{}/indexes", self.control_url);
        debug!(%url, name = %request.name, "create index");
        let response = send(authorize(self.client.post(&url), &self.api_key).json(request)).await?;
        Ok(response.json().await?)
    }

    /// Data-plane handle for the index served at `host`.
    pub fn index(&self, host: &str) -> IndexClient {
        IndexClient {
            client: Arc::clone(&self.client),
            api_key: self.api_key.clone(),
            base_url: normalize_base_url(host),
        }
    }
}

/// Data-plane client bound to a single index host.
#[derive(Clone)]
pub struct IndexClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl IndexClient {
    /// Upsert text records into an index with integrated embedding.
    /// Each record is one NDJSON line.
    pub async fn upsert_records(
        &self,
        namespace: &str,
        records: &[Map<String, Value>],
    ) -> Result<usize, PineconeError> {
        let url = format!("{}/records/namespaces/{}/upsert", self.base_url, namespace);
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }
        debug!(%url, count = records.len(), "upsert records");
        let request = authorize(self.client.post(&url), &self.api_key)
            .header("Content-Type", "application/x-ndjson")
            .body(body);
        send(request).await?;
        Ok(records.len())
    }

    /// Text search against an index with integrated embedding.
    pub async fn search_records(
        &self,
        namespace: &str,
        text: &str,
        top_k: usize,
        fields: &[String],
    ) -> Result<Vec<SearchHit>, PineconeError> {
        let url = format!("{}/records/namespaces/{}/search", self.base_url, namespace);
        let body = SearchRequest {
            query: SearchQuery {
                inputs: SearchInputs { text },
                top_k,
            },
            fields,
        };
        debug!(%url, top_k, "search records");
        let response = send(authorize(self.client.post(&url), &self.api_key).json(&body)).await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.result.hits)
    }

    pub async fn upsert_vectors(&self, namespace: &str, vectors: &[Vector]) -> Result<usize, PineconeError> {
        let url = format!("{}/vectors/upsert", self.base_url);
        let body = UpsertVectorsRequest { vectors, namespace };
        debug!(%url, count = vectors.len(), "upsert vectors");
        let response = send(authorize(self.client.post(&url), &self.api_key).json(&body)).await?;
        let parsed: UpsertVectorsResponse = response.json().await?;
        Ok(parsed.upserted_count)
    }

    pub async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, PineconeError> {
        let url = format!("{}/query", self.base_url);
        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        debug!(%url, top_k, "query vectors");
        let response = send(authorize(self.client.post(&url), &self.api_key).json(&body)).await?;
        let parsed: QueryResponse = response.json().await?;
        Ok(parsed.matches)
    }

    pub async fn describe_index_stats(&self) -> Result<IndexStats, PineconeError> {
        let url = format!("{}/describe_index_stats", self.base_url);
        let request = authorize(self.client.post(&url), &self.api_key).json(&serde_json::json!({}));
        let response = send(request).await?;
        let parsed: DescribeStatsResponse = response.json().await?;
        Ok(IndexStats {
            dimension: parsed.dimension,
            total_vector_count: parsed.total_vector_count,
        })
    }
}

fn authorize(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
}

async fn send(request: RequestBuilder) -> Result<Response, PineconeError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PineconeError::from_status(status, body))
}
