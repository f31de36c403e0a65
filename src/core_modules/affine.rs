// THEORY:
// The geometric half of the augmenter. Rotation, shift, shear and zoom are all
// affine maps, so they are composed into a single 3x3 matrix and applied in one
// pass instead of resampling the image four times.
//
// Conventions:
// 1.  **Coordinates are (row, column)**, matching the height x width x channel
//     layout of the buffers. `tx` therefore moves rows and `ty` moves columns.
// 2.  **Inverse mapping**: the matrix maps an *output* coordinate to the *input*
//     coordinate it is read from. Every output pixel gets exactly one value, so
//     there are no holes to patch afterwards.
// 3.  **Centred**: the composed matrix is conjugated with a translation to the
//     image centre so rotation and zoom pivot around the middle, not the corner.
// 4.  **Fill**: any read outside the source is resolved by `FillMode`.

use crate::core_modules::augmentation_config::FillMode;
use crate::core_modules::transform_params::TransformParams;
use image::{Rgb, Rgb32FImage};
use std::ops::Mul;

/// A homogeneous 2-D affine transform over (row, column) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix(pub [[f64; 3]; 3]);

impl AffineMatrix {
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn rotation(theta_degrees: f64) -> Self {
        let theta = theta_degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        Self([[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    pub fn shear(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self([[1.0, -sin, 0.0], [0.0, cos, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn zoom(zx: f64, zy: f64) -> Self {
        Self([[zx, 0.0, 0.0], [0.0, zy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Composes rotation, shift, shear and zoom in that order.
    pub fn from_params(params: &TransformParams) -> Self {
        Self::rotation(params.theta)
            * Self::translation(params.tx, params.ty)
            * Self::shear(params.shear)
            * Self::zoom(params.zx, params.zy)
    }

    /// Moves the pivot of `self` from the origin to the centre of a `height` x `width` image.
    pub fn centered(self, height: u32, width: u32) -> Self {
        let o_row = f64::from(height) / 2.0 + 0.5;
        let o_col = f64::from(width) / 2.0 + 0.5;
        Self::translation(o_row, o_col) * self * Self::translation(-o_row, -o_col)
    }

    /// Maps an output coordinate to the source coordinate it samples.
    #[inline]
    pub fn apply(&self, row: f64, col: f64) -> (f64, f64) {
        let m = &self.0;
        (
            m[0][0] * row + m[0][1] * col + m[0][2],
            m[1][0] * row + m[1][1] * col + m[1][2],
        )
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;

    fn mul(self, rhs: AffineMatrix) -> AffineMatrix {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        AffineMatrix(out)
    }
}

/// Resamples `image` through `matrix` with bilinear interpolation.
///
/// The output has the same dimensions as the input.
pub fn warp(image: &Rgb32FImage, matrix: &AffineMatrix, fill_mode: FillMode, cval: f32) -> Rgb32FImage {
    let (width, height) = image.dimensions();
    Rgb32FImage::from_fn(width, height, |x, y| {
        let (src_row, src_col) = matrix.apply(f64::from(y), f64::from(x));
        sample_bilinear(image, src_row, src_col, fill_mode, cval)
    })
}

fn sample_bilinear(image: &Rgb32FImage, row: f64, col: f64, fill_mode: FillMode, cval: f32) -> Rgb<f32> {
    let row_floor = row.floor();
    let col_floor = col.floor();
    let fr = (row - row_floor) as f32;
    let fc = (col - col_floor) as f32;
    let (r0, c0) = (row_floor as i64, col_floor as i64);

    let taps = [
        (0, 0, (1.0 - fr) * (1.0 - fc)),
        (0, 1, (1.0 - fr) * fc),
        (1, 0, fr * (1.0 - fc)),
        (1, 1, fr * fc),
    ];

    let mut out = [0.0f32; 3];
    for (dr, dc, weight) in taps {
        // Skipping zero weights keeps integer-aligned reads exact.
        if weight == 0.0 {
            continue;
        }
        let pixel = fetch(image, r0 + dr, c0 + dc, fill_mode, cval);
        for (acc, value) in out.iter_mut().zip(pixel) {
            *acc += weight * value;
        }
    }
    Rgb(out)
}

fn fetch(image: &Rgb32FImage, row: i64, col: i64, fill_mode: FillMode, cval: f32) -> [f32; 3] {
    let (width, height) = image.dimensions();
    match (
        map_index(row, height, fill_mode),
        map_index(col, width, fill_mode),
    ) {
        (Some(r), Some(c)) => image.get_pixel(c, r).0,
        _ => [cval; 3],
    }
}

/// Resolves a possibly out-of-range index into `0..len` according to `fill_mode`.
///
/// Returns `None` when the sample should take the constant fill value.
pub fn map_index(index: i64, len: u32, fill_mode: FillMode) -> Option<u32> {
    if len == 0 {
        return None;
    }
    let n = i64::from(len);
    let mapped = match fill_mode {
        FillMode::Constant => {
            if (0..n).contains(&index) {
                index
            } else {
                return None;
            }
        }
        FillMode::Nearest => index.clamp(0, n - 1),
        FillMode::Reflect => {
            let period = 2 * n;
            let m = index.rem_euclid(period);
            if m >= n { period - 1 - m } else { m }
        }
        FillMode::Wrap => index.rem_euclid(n),
    };
    Some(mapped as u32)
}
