pub mod affine;
pub mod augmentation_config;
pub mod augmenter;
pub mod grid;
pub mod image_batch;
pub mod photometric;
pub mod transform_params;
pub mod utils;
