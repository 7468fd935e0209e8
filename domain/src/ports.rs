use crate::models::{QuestionRecord, ScoredQuestion};
use shared::types::Result;

/// Read side of the remote index.
pub trait QuestionSearch {
    /// Up to `top_k` stored questions closest to `question`.
    fn search(
        &self,
        question: &str,
        top_k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredQuestion>>> + Send;
}

/// Write side of the remote index.
pub trait RecordSink {
    /// Validate a batch and fill in whatever the sink computes locally.
    /// Work already done on a record is kept, so a batch prepared once
    /// can be resent without repeating it.
    fn prepare(
        &self,
        _batch: &mut [QuestionRecord],
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Submit one batch, returning the number of records the service accepted.
    fn upsert_batch(
        &self,
        batch: &[QuestionRecord],
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
