// THEORY:
// The augmentation flow operates on batches, never on bare images. An
// `ImageBatch` is the leading "batch" dimension wrapped around one or more
// equally typed RGB buffers. Loading a file always produces a batch of one.

use crate::error::{Error, Result};
use image::RgbImage;
use std::path::Path;

/// A non-empty, ordered list of RGB images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    images: Vec<RgbImage>,
}

impl ImageBatch {
    /// Wraps a single image in a batch of size 1.
    pub fn from_single(image: RgbImage) -> Self {
        Self { images: vec![image] }
    }

    pub fn new(images: Vec<RgbImage>) -> Result<Self> {
        if images.is_empty() {
            return Err(Error::invalid("images", "a batch needs at least one image"));
        }
        Ok(Self { images })
    }

    /// Callers guarantee `images` is non-empty.
    pub(crate) fn from_vec_unchecked(images: Vec<RgbImage>) -> Self {
        debug_assert!(!images.is_empty());
        Self { images }
    }

    /// Opens, decodes and converts an image file to RGB, returning a batch of one.
    ///
    /// The file handle is released before this returns.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            width = decoded.width(),
            height = decoded.height(),
            color = ?decoded.color(),
            "decoded image"
        );
        Ok(Self::from_single(decoded.to_rgb8()))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[RgbImage] {
        &self.images
    }

    /// The first image. Batches are never empty.
    pub fn first(&self) -> &RgbImage {
        &self.images[0]
    }

    pub fn into_images(self) -> Vec<RgbImage> {
        self.images
    }
}
