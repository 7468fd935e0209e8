use crate::batching::Batches;
use domain::models::QuestionRecord;
use domain::ports::RecordSink;
use infrastructure::errors::{DatasetError, PineconeError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Upper bound on records per request.
    pub batch_size: usize,
    /// Total tries per batch, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl IngestOptions {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub index: usize,
    pub size: usize,
    pub records_sent: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub batches: usize,
    pub records: usize,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    /// `index` is zero-based.
    #[error("batch {index} failed after {attempts} attempt(s): {source}")]
    Batch {
        index: usize,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("dataset error while assembling batch {index}: {source}")]
    Dataset {
        index: usize,
        #[source]
        source: DatasetError,
    },
}

impl IngestError {
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            IngestError::Batch { index, .. } | IngestError::Dataset { index, .. } => Some(*index),
            IngestError::InvalidBatchSize => None,
        }
    }
}

/// One-shot loader: batches records and pushes them into a [`RecordSink`].
pub struct IngestService<S> {
    sink: S,
    options: IngestOptions,
}

impl<S: RecordSink> IngestService<S> {
    pub fn new(sink: S, options: IngestOptions) -> Result<Self, IngestError> {
        if options.batch_size == 0 {
            return Err(IngestError::InvalidBatchSize);
        }
        Ok(Self { sink, options })
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Send every record, stopping at the first batch that cannot be
    /// delivered. `on_batch` runs after each successful batch.
    pub async fn ingest<I, F>(&self, records: I, mut on_batch: F) -> Result<IngestReport, IngestError>
    where
        I: IntoIterator<Item = Result<QuestionRecord, DatasetError>>,
        F: FnMut(&BatchProgress),
    {
        let mut report = IngestReport::default();
        let batches = Batches::new(records.into_iter(), self.options.batch_size);

        for (index, batch) in batches.enumerate() {
            let mut batch = batch
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| IngestError::Dataset { index, source })?;

            let accepted = self.send_with_retry(index, &mut batch).await?;
            report.batches += 1;
            report.records += batch.len();
            info!(batch = index, size = batch.len(), accepted, "batch upserted");

            on_batch(&BatchProgress {
                index,
                size: batch.len(),
                records_sent: report.records,
            });
        }

        Ok(report)
    }

    async fn send_with_retry(&self, index: usize, batch: &mut [QuestionRecord]) -> Result<usize, IngestError> {
        let mut attempt = 1;
        loop {
            match self.deliver(batch).await {
                Ok(accepted) => return Ok(accepted),
                Err(err) if attempt < self.options.max_attempts && is_transient(&err) => {
                    let delay = self.options.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(batch = index, attempt, ?delay, error = %err, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(IngestError::Batch {
                        index,
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }

    /// Preparation fills `batch` in place, so a retry resends it as is.
    async fn deliver(&self, batch: &mut [QuestionRecord]) -> anyhow::Result<usize> {
        self.sink.prepare(batch).await?;
        self.sink.upsert_batch(batch).await
    }
}

fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PineconeError>()
        .is_some_and(PineconeError::is_transient)
}
