/// Splits any iterator into consecutive batches of at most `size` items,
/// pulling from the source lazily.
pub struct Batches<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Batches<I> {
    /// `size` must be non-zero.
    pub fn new(inner: I, size: usize) -> Self {
        assert!(size > 0, "batch size must be non-zero");
        Self { inner, size }
    }
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

/// Number of batches `records` items produce at `size` per batch.
pub fn batch_count(records: usize, size: usize) -> usize {
    records.div_ceil(size)
}
