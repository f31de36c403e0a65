// THEORY:
// `TransformParams` is one concrete draw from an `AugmentationConfig`. Splitting
// "draw" from "apply" keeps the random part tiny and testable: the bounds and
// the flip frequency can be checked over thousands of draws without touching a
// single pixel, and a fixed set of parameters can be replayed on any image.
//
// Draw order matters for reproducibility. Each value is drawn only when its
// range is non-zero, in this order: rotation, vertical shift, horizontal shift,
// shear, zoom (x then y), channel shift, horizontal flip, vertical flip.

use crate::core_modules::augmentation_config::AugmentationConfig;
use rand::Rng;

/// Flip probability for both mirror axes when enabled.
pub const FLIP_PROBABILITY: f64 = 0.5;

/// A single sampled perturbation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Rotation angle in degrees.
    pub theta: f64,
    /// Shift along the row axis, in pixels.
    pub tx: f64,
    /// Shift along the column axis, in pixels.
    pub ty: f64,
    /// Shear angle in radians.
    pub shear: f64,
    /// Zoom factor along the row axis.
    pub zx: f64,
    /// Zoom factor along the column axis.
    pub zy: f64,
    /// Intensity added to every channel, if a channel shift was drawn.
    pub channel_shift_intensity: Option<f64>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformParams {
    pub fn identity() -> Self {
        Self {
            theta: 0.0,
            tx: 0.0,
            ty: 0.0,
            shear: 0.0,
            zx: 1.0,
            zy: 1.0,
            channel_shift_intensity: None,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }

    /// Draws one set of parameters for an image of the given size.
    pub fn sample<R: Rng + ?Sized>(
        config: &AugmentationConfig,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Self {
        let mut params = Self::identity();

        if config.rotation_range > 0.0 {
            params.theta = symmetric(rng, config.rotation_range);
        }
        if config.height_shift_range > 0.0 {
            params.tx = symmetric(rng, config.height_shift_range) * f64::from(height);
        }
        if config.width_shift_range > 0.0 {
            params.ty = symmetric(rng, config.width_shift_range) * f64::from(width);
        }
        if config.shear_range > 0.0 {
            params.shear = symmetric(rng, config.shear_range);
        }
        if config.zoom_range > 0.0 {
            let (low, high) = config.zoom_bounds();
            params.zx = rng.gen_range(low..=high);
            params.zy = rng.gen_range(low..=high);
        }
        if config.channel_shift_range > 0.0 {
            params.channel_shift_intensity = Some(symmetric(rng, config.channel_shift_range));
        }
        if config.horizontal_flip {
            params.flip_horizontal = rng.gen_bool(FLIP_PROBABILITY);
        }
        if config.vertical_flip {
            params.flip_vertical = rng.gen_bool(FLIP_PROBABILITY);
        }

        params
    }

    /// True when rotation, shift, shear and zoom all leave coordinates unchanged.
    pub fn is_geometric_identity(&self) -> bool {
        self.theta == 0.0
            && self.tx == 0.0
            && self.ty == 0.0
            && self.shear == 0.0
            && self.zx == 1.0
            && self.zy == 1.0
    }
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    rng.gen_range(-range..=range)
}
