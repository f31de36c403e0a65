// THEORY:
// The `Augmenter` is the sampler: given one source image and the fixed
// configuration, it produces a freshly perturbed variant on every call.
//
// Key architectural principles:
// 1.  **Draw, then apply**: `sample_params` is the only place randomness enters.
//     `apply_transform` is a pure function of (image, params, config), so any
//     draw can be replayed exactly.
// 2.  **Float working space**: the warp interpolates, and the channel shift may
//     be fractional, so the pipeline runs on an `Rgb32FImage` and truncates back
//     to `u8` once at the end.
// 3.  **Fixed stage order**: affine warp, channel shift, horizontal flip,
//     vertical flip. The warp is skipped entirely when the geometric draw is the
//     identity, which makes an all-zero configuration an exact no-op.

use crate::core_modules::affine::{self, AffineMatrix};
use crate::core_modules::augmentation_config::AugmentationConfig;
use crate::core_modules::photometric;
use crate::core_modules::transform_params::TransformParams;
use crate::core_modules::utils::image_helper::{to_float, to_u8};
use crate::error::Result;
use image::RgbImage;
use rand::Rng;

/// Produces randomly perturbed variants of an image under a fixed configuration.
#[derive(Debug, Clone)]
pub struct Augmenter {
    config: AugmentationConfig,
}

impl Augmenter {
    /// Validates `config` and builds an augmenter around it.
    pub fn new(config: AugmentationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AugmentationConfig {
        &self.config
    }

    pub fn sample_params<R: Rng + ?Sized>(&self, width: u32, height: u32, rng: &mut R) -> TransformParams {
        TransformParams::sample(&self.config, width, height, rng)
    }

    /// Applies a concrete draw to `image`. Output dimensions always match the input.
    pub fn apply_transform(&self, image: &RgbImage, params: &TransformParams) -> RgbImage {
        let (width, height) = image.dimensions();
        let mut working = to_float(image);

        if !params.is_geometric_identity() {
            let matrix = AffineMatrix::from_params(params).centered(height, width);
            working = affine::warp(&working, &matrix, self.config.fill_mode, self.config.cval);
        }

        if let Some(intensity) = params.channel_shift_intensity {
            photometric::channel_shift(&mut working, intensity as f32);
        }
        if params.flip_horizontal {
            photometric::flip_horizontal(&mut working);
        }
        if params.flip_vertical {
            photometric::flip_vertical(&mut working);
        }

        to_u8(&working)
    }

    /// Draws parameters from `rng` and applies them.
    pub fn random_transform<R: Rng + ?Sized>(&self, image: &RgbImage, rng: &mut R) -> RgbImage {
        let (width, height) = image.dimensions();
        let params = self.sample_params(width, height, rng);
        tracing::debug!(?params, "sampled transform");
        self.apply_transform(image, &params)
    }
}
