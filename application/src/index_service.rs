use domain::models::{EmbeddingMode, IndexStats};
use infrastructure::config::Config;
use infrastructure::errors::PineconeError;
use infrastructure::pinecone_client::{
    CreateIndex, CreateIndexForModel, EmbedSpec, IndexClient, IndexDescription, IndexSpec,
    PineconeClient, ServerlessSpec,
};
use infrastructure::question_index::QuestionIndex;
use shared::types::Result;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Whether [`IndexService::ensure_index`] had to create the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Existing,
    Created,
}

/// Resolves, and when asked creates, the index named in the config.
pub struct IndexService {
    client: PineconeClient,
    config: Config,
    poll_interval: Duration,
    max_polls: u32,
}

impl IndexService {
    pub fn new(config: Config) -> Result<Self> {
        let client = PineconeClient::new(&config.api_key, &config.control_url)?;
        Ok(Self {
            client,
            config,
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
        })
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect to an index that must already exist.
    pub async fn connect(&self) -> Result<QuestionIndex> {
        let index = match &self.config.index_host {
            Some(host) => self.client.index(host),
            None => {
                let description = self
                    .client
                    .describe_index(&self.config.index_name)
                    .await?
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "index '{}' does not exist; load it with qa_ingest first",
                            self.config.index_name
                        )
                    })?;
                self.data_plane(description).await?
            }
        };
        Ok(QuestionIndex::new(index, &self.config))
    }

    /// Connect to the index, creating it first when it does not exist.
    pub async fn ensure_index(&self) -> Result<(QuestionIndex, IndexOrigin)> {
        if self.config.index_host.is_some() {
            return Ok((self.connect().await?, IndexOrigin::Existing));
        }

        let name = &self.config.index_name;
        let (description, origin) = match self.client.describe_index(name).await? {
            Some(description) => {
                info!(index = %name, "index already exists");
                let configured = &self.config.embed_model;
                if let Some(embed) = description.embed.as_ref().filter(|e| &e.model != configured) {
                    warn!(
                        index = %name,
                        model = %embed.model,
                        %configured,
                        "index embeds with a different model"
                    );
                }
                (description, IndexOrigin::Existing)
            }
            None => {
                info!(index = %name, mode = %self.config.mode, "creating index");
                (self.create().await?, IndexOrigin::Created)
            }
        };

        let index = self.data_plane(description).await?;
        Ok((QuestionIndex::new(index, &self.config), origin))
    }

    pub async fn stats(&self, index: &QuestionIndex) -> Result<IndexStats> {
        Ok(index.client().describe_index_stats().await?)
    }

    async fn create(&self) -> std::result::Result<IndexDescription, PineconeError> {
        let config = &self.config;
        match config.mode {
            EmbeddingMode::Integrated => {
                let field_map = HashMap::from([("text".to_string(), config.text_field.clone())]);
                self.client
                    .create_index_for_model(&CreateIndexForModel {
                        name: config.index_name.clone(),
                        cloud: config.cloud.clone(),
                        region: config.region.clone(),
                        embed: EmbedSpec {
                            model: config.embed_model.clone(),
                            field_map,
                        },
                    })
                    .await
            }
            EmbeddingMode::Client => {
                self.client
                    .create_index(&CreateIndex {
                        name: config.index_name.clone(),
                        dimension: config.dimension,
                        metric: "cosine".to_string(),
                        spec: IndexSpec {
                            serverless: ServerlessSpec {
                                cloud: config.cloud.clone(),
                                region: config.region.clone(),
                            },
                        },
                    })
                    .await
            }
        }
    }

    /// Wait for the index to report ready, then bind a data-plane client.
    async fn data_plane(&self, mut description: IndexDescription) -> Result<IndexClient> {
        let mut polls = 0;
        while !description.is_ready() {
            if polls >= self.max_polls {
                return Err(PineconeError::NotReady(description.name).into());
            }
            debug!(index = %description.name, state = %description.status.state, "waiting for index");
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            description = self
                .client
                .describe_index(&description.name)
                .await?
                .ok_or_else(|| PineconeError::NotFound(description.name.clone()))?;
        }

        // Integrated indexes embed server-side, so only client vectors must match.
        if let (EmbeddingMode::Client, Some(expected)) = (self.config.mode, description.dimension) {
            if expected != self.config.dimension {
                return Err(anyhow::anyhow!(
                    "index '{}' has dimension {}, but the configuration expects {} (set QA_DIMENSION)",
                    description.name,
                    expected,
                    self.config.dimension
                ));
            }
        }

        Ok(self.client.index(&description.host))
    }
}
