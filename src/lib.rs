// THEORY:
// This file is the main entry point for the `aug_vision` library crate.
// It exposes the two halves of the augmentation preview tool:
//
// 1.  **Sampling**: `Augmenter` turns an immutable `AugmentationConfig` into
//     concrete random draws (`TransformParams`) and applies them to an image.
//     `AugmentationFlow` wraps it as a pull-based, infinite sequence of
//     augmented batches, and `ParallelFlow` computes the same sequence on a
//     worker pool.
// 2.  **Display**: `GridLayout` and `GridRenderer` arrange a list of images
//     into rows and columns and write the resulting figure to disk.
//
// All pixel-level math lives in `core_modules`; `pipeline` and
// `parallel_pipeline` are the high-level entry points.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::augmentation_config::{AugmentationConfig, FillMode};
pub use core_modules::augmenter::Augmenter;
pub use core_modules::grid::{GridLayout, GridRenderer, RenderConfig};
pub use core_modules::image_batch::ImageBatch;
pub use core_modules::transform_params::TransformParams;
pub use error::{Error, Result};
pub use parallel_pipeline::ParallelFlow;
pub use pipeline::AugmentationFlow;
