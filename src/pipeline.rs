// THEORY:
// The `pipeline` module is the top-level API for drawing augmented samples. An
// `AugmentationFlow` binds an `Augmenter` to a source batch and hands out an
// endless, pull-based sequence of augmented batches: call `next_batch()` (or use
// it as an `Iterator`) as many times as needed.
//
// Reproducibility is per sample, not per flow. Sample `k` of image `j` always
// draws from its own ChaCha8 stream, numbered `k * batch_len + j`, under one
// base seed. That makes any single sample reproducible without replaying the
// ones before it, and lets `ParallelFlow` compute samples out of order while
// still producing exactly the sequence this flow would.

use crate::core_modules::augmenter::Augmenter;
use crate::core_modules::image_batch::ImageBatch;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Builds the RNG dedicated to one sample.
pub(crate) fn sample_rng(base_seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    rng.set_stream(stream);
    rng
}

/// Augments every image of `batch` for the `draw`-th pull of a flow.
pub(crate) fn augment_batch_at(
    augmenter: &Augmenter,
    batch: &ImageBatch,
    base_seed: u64,
    draw: u64,
) -> ImageBatch {
    let batch_len = batch.len() as u64;
    let images = batch
        .images()
        .iter()
        .enumerate()
        .map(|(j, image)| {
            let mut rng = sample_rng(base_seed, draw * batch_len + j as u64);
            augmenter.random_transform(image, &mut rng)
        })
        .collect();
    // Same length as the source batch, which is never empty.
    ImageBatch::from_vec_unchecked(images)
}

/// A lazy, infinite sequence of augmented batches.
#[derive(Debug, Clone)]
pub struct AugmentationFlow {
    augmenter: Augmenter,
    batch: ImageBatch,
    base_seed: u64,
    next_draw: u64,
}

impl AugmentationFlow {
    /// Creates a flow over `batch`. Without a seed, one is drawn from the thread RNG.
    pub fn new(augmenter: Augmenter, batch: ImageBatch, seed: Option<u64>) -> Self {
        let base_seed = seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        tracing::debug!(base_seed, batch_len = batch.len(), "created augmentation flow");
        Self {
            augmenter,
            batch,
            base_seed,
            next_draw: 0,
        }
    }

    /// The seed every sample stream derives from. Pass it back to `new` to replay a run.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Number of batches drawn since creation or the last `restart`.
    pub fn draws(&self) -> u64 {
        self.next_draw
    }

    pub fn augmenter(&self) -> &Augmenter {
        &self.augmenter
    }

    pub fn source(&self) -> &ImageBatch {
        &self.batch
    }

    /// Returns the next augmented batch.
    pub fn next_batch(&mut self) -> ImageBatch {
        let out = augment_batch_at(&self.augmenter, &self.batch, self.base_seed, self.next_draw);
        self.next_draw += 1;
        out
    }

    /// Rewinds to the first draw; the sequence then repeats from the start.
    pub fn restart(&mut self) {
        self.next_draw = 0;
    }

    /// Hands the position of this flow over to a worker pool.
    pub(crate) fn into_parts(self) -> (Augmenter, ImageBatch, u64, u64) {
        (self.augmenter, self.batch, self.base_seed, self.next_draw)
    }
}

impl Iterator for AugmentationFlow {
    type Item = ImageBatch;

    fn next(&mut self) -> Option<ImageBatch> {
        Some(self.next_batch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::augmentation_config::AugmentationConfig;
    use image::{Rgb, RgbImage};

    fn source() -> ImageBatch {
        ImageBatch::from_single(RgbImage::from_fn(32, 24, |x, y| {
            Rgb([(x * 7) as u8, (y * 9) as u8, ((x + y) * 3) as u8])
        }))
    }

    fn demo_flow(seed: Option<u64>) -> AugmentationFlow {
        let augmenter = Augmenter::new(AugmentationConfig::demo()).expect("valid config");
        AugmentationFlow::new(augmenter, source(), seed)
    }

    #[test]
    fn each_pull_yields_one_image_of_source_size() {
        let mut flow = demo_flow(Some(1));
        for batch in flow.by_ref().take(10) {
            assert_eq!(batch.len(), 1);
            assert_eq!(batch.first().dimensions(), (32, 24));
        }
        assert_eq!(flow.draws(), 10);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a: Vec<_> = demo_flow(Some(2024)).take(5).collect();
        let b: Vec<_> = demo_flow(Some(2024)).take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn successive_pulls_differ() {
        let mut flow = demo_flow(Some(5));
        let first = flow.next_batch();
        let second = flow.next_batch();
        assert_ne!(first, second);
    }

    #[test]
    fn restart_replays_from_the_beginning() {
        let mut flow = demo_flow(Some(77));
        let first: Vec<_> = flow.by_ref().take(3).collect();
        flow.restart();
        assert_eq!(flow.draws(), 0);
        let again: Vec<_> = flow.by_ref().take(3).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn unseeded_flow_reports_its_seed() {
        let mut flow = demo_flow(None);
        let seed = flow.base_seed();
        let original = flow.next_batch();

        let mut replay = demo_flow(Some(seed));
        assert_eq!(replay.next_batch(), original);
    }

    #[test]
    fn identity_config_flow_returns_source() {
        let augmenter = Augmenter::new(AugmentationConfig::default()).expect("valid config");
        let mut flow = AugmentationFlow::new(augmenter, source(), Some(9));
        assert_eq!(flow.next_batch(), source());
    }

    #[test]
    fn sample_streams_are_independent_of_order() {
        let augmenter = Augmenter::new(AugmentationConfig::demo()).expect("valid config");
        let batch = source();
        let third_direct = augment_batch_at(&augmenter, &batch, 10, 2);

        let mut flow = AugmentationFlow::new(augmenter, batch, Some(10));
        let third_pulled = flow.nth(2).expect("infinite flow");
        assert_eq!(third_direct, third_pulled);
    }
}
