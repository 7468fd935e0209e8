use domain::models::ScoredQuestion;
use domain::ports::QuestionSearch;
use shared::telemetry::Telemetry;
use shared::types::Result;
use tracing::debug;

/// Runs one question against the index and returns at most `top_k` hits,
/// best first.
pub struct QueryService<S> {
    searcher: S,
    top_k: usize,
}

impl<S: QuestionSearch> QueryService<S> {
    pub fn new(searcher: S, top_k: usize) -> Self {
        Self { searcher, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn searcher(&self) -> &S {
        &self.searcher
    }

    pub async fn ask(&self, question: &str) -> Result<Vec<ScoredQuestion>> {
        let telemetry = Telemetry::new();
        let mut hits = self.searcher.search(question, self.top_k).await?;
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(self.top_k);
        debug!(hits = hits.len(), elapsed_ms = telemetry.elapsed_ms(), "query finished");
        Ok(hits)
    }
}
