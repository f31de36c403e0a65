use crate::core_modules::augmenter::Augmenter;
use crate::core_modules::image_batch::ImageBatch;
use crate::error::Result;
use crate::pipeline::{AugmentationFlow, augment_batch_at};
use futures::future::try_join_all;
use std::sync::Arc;

/// Draws many augmented batches at once on a pool of blocking workers.
///
/// Draws are dealt round-robin across workers. Because each sample owns its
/// RNG stream, the returned batches are exactly what the same number of
/// `AugmentationFlow::next_batch` calls would have produced, in the same order.
pub struct ParallelFlow {
    augmenter: Arc<Augmenter>,
    batch: Arc<ImageBatch>,
    base_seed: u64,
    next_draw: u64,
    workers: usize,
}

impl ParallelFlow {
    /// Continues `flow` from its current position, with one worker per CPU.
    pub fn new(flow: AugmentationFlow) -> Self {
        let (augmenter, batch, base_seed, next_draw) = flow.into_parts();
        Self {
            augmenter: Arc::new(augmenter),
            batch: Arc::new(batch),
            base_seed,
            next_draw,
            workers: num_cpus::get().max(1),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn draws(&self) -> u64 {
        self.next_draw
    }

    /// Computes the next `count` batches.
    pub async fn take(&mut self, count: usize) -> Result<Vec<ImageBatch>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let first_draw = self.next_draw;
        let workers = self.workers.min(count);
        tracing::debug!(count, workers, first_draw, "dispatching augmentation draws");

        let handles = (0..workers).map(|worker| {
            let augmenter = Arc::clone(&self.augmenter);
            let batch = Arc::clone(&self.batch);
            let base_seed = self.base_seed;
            tokio::task::spawn_blocking(move || {
                (worker..count)
                    .step_by(workers)
                    .map(|i| {
                        let draw = first_draw + i as u64;
                        (i, augment_batch_at(&augmenter, &batch, base_seed, draw))
                    })
                    .collect::<Vec<_>>()
            })
        });

        let mut results: Vec<(usize, ImageBatch)> = try_join_all(handles).await?.into_iter().flatten().collect();
        results.sort_by_key(|(i, _)| *i);

        self.next_draw += count as u64;
        Ok(results.into_iter().map(|(_, batch)| batch).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::augmentation_config::AugmentationConfig;
    use image::{Rgb, RgbImage};

    fn flow(seed: u64) -> AugmentationFlow {
        let augmenter = Augmenter::new(AugmentationConfig::demo()).expect("valid config");
        let source = ImageBatch::from_single(RgbImage::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, 200])
        }));
        AugmentationFlow::new(augmenter, source, Some(seed))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn parallel_matches_sequential() {
        let sequential: Vec<_> = flow(31).take(10).collect();

        let mut parallel = ParallelFlow::new(flow(31)).with_workers(3);
        let batches = parallel.take(10).await.expect("workers succeed");

        assert_eq!(batches.len(), 10);
        assert_eq!(batches, sequential);
        assert_eq!(parallel.draws(), 10);
    }

    #[tokio::test]
    async fn continues_where_the_flow_left_off() {
        let mut sequential = flow(8);
        let expected: Vec<_> = sequential.by_ref().take(4).collect();

        let mut head = flow(8);
        let first = head.next_batch();
        assert_eq!(first, expected[0]);

        let mut parallel = ParallelFlow::new(head).with_workers(2);
        let rest = parallel.take(3).await.expect("workers succeed");
        assert_eq!(rest.as_slice(), &expected[1..]);

        let more = parallel.take(1).await.expect("workers succeed");
        assert_eq!(more[0], sequential.next_batch());
    }

    #[tokio::test]
    async fn zero_count_is_empty() {
        let mut parallel = ParallelFlow::new(flow(1));
        assert!(parallel.take(0).await.expect("no work").is_empty());
        assert_eq!(parallel.draws(), 0);
        assert!(parallel.workers() >= 1);
    }
}
