// src/core/batch_pipeline.rs
use std::future::Future;
use futures::future::join_all;
use tracing::{debug, info};

use crate::error::{AuditError, Result};

/// Runs work items in fixed-size chunks.
///
/// All items of a chunk are polled concurrently on the current task; the next
/// chunk is dispatched only after every item of the previous one has resolved,
/// so at most `batch_size` operations are ever in flight. The first failure in
/// a chunk aborts the run once that chunk has settled.
pub struct BatchPipeline {
    batch_size: usize,
}

impl BatchPipeline {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(AuditError::Config("batch size must be at least 1".to_string()));
        }
        Ok(Self { batch_size })
    }

    /// Number of chunks needed for `items` work items
    pub fn chunk_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size)
    }

    /// Run `op` over every item, returning results in input order
    pub async fn run<'a, T, R, F, Fut>(&self, items: &'a [T], op: F) -> Result<Vec<R>>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        self.run_with(items, op, |_, _| Ok(())).await
    }

    /// Like [`run`](Self::run), calling `on_chunk` with each chunk's results
    /// as soon as the chunk completes
    pub async fn run_with<'a, T, R, F, Fut, C>(
        &self,
        items: &'a [T],
        op: F,
        mut on_chunk: C,
    ) -> Result<Vec<R>>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<R>>,
        C: FnMut(usize, &[R]) -> Result<()>,
    {
        let total = self.chunk_count(items.len());
        let mut results = Vec::with_capacity(items.len());

        info!("Processing {} items in {} chunks (batch size {})", items.len(), total, self.batch_size);

        for (index, chunk) in items.chunks(self.batch_size).enumerate() {
            debug!("Dispatching chunk {}/{} ({} items)", index + 1, total, chunk.len());

            let outcomes = join_all(chunk.iter().map(&op)).await;
            let chunk_results = outcomes.into_iter().collect::<Result<Vec<R>>>()?;

            on_chunk(index, &chunk_results)?;
            info!("Chunk {}/{} complete", index + 1, total);

            results.extend(chunk_results);
        }

        Ok(results)
    }
}
