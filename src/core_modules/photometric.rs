// THEORY:
// Photometric and mirror operations. These run after the affine warp and work
// in place on the float buffer, so the augmenter only allocates once per sample.

use image::Rgb32FImage;
use image::imageops;

/// Adds `intensity` to every channel, clipping each result to the image's own
/// global min/max so the shift never invents values outside the source range.
pub fn channel_shift(image: &mut Rgb32FImage, intensity: f32) {
    let (min, max) = image
        .as_raw()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    for value in image.iter_mut() {
        *value = (*value + intensity).clamp(min, max);
    }
}

pub fn flip_horizontal(image: &mut Rgb32FImage) {
    imageops::flip_horizontal_in_place(image);
}

pub fn flip_vertical(image: &mut Rgb32FImage) {
    imageops::flip_vertical_in_place(image);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn channel_shift_clips_to_image_range() {
        let mut image = Rgb32FImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgb([10.0, 20.0, 30.0]) } else { Rgb([40.0, 50.0, 60.0]) }
        });
        channel_shift(&mut image, 15.0);
        assert_eq!(image.get_pixel(0, 0).0, [25.0, 35.0, 45.0]);
        assert_eq!(image.get_pixel(1, 0).0, [55.0, 60.0, 60.0]);

        channel_shift(&mut image, -100.0);
        assert_eq!(image.get_pixel(1, 0).0, [25.0; 3]);
    }

    #[test]
    fn channel_shift_on_flat_image_is_noop() {
        let mut image = Rgb32FImage::from_pixel(4, 4, Rgb([0.0; 3]));
        channel_shift(&mut image, 9.0);
        assert!(image.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn flips_mirror_the_right_axis() {
        let mut image = Rgb32FImage::from_fn(3, 2, |x, y| Rgb([x as f32, y as f32, 0.0]));

        flip_horizontal(&mut image);
        assert_eq!(image.get_pixel(0, 0).0[0], 2.0);
        assert_eq!(image.get_pixel(0, 0).0[1], 0.0);

        flip_vertical(&mut image);
        assert_eq!(image.get_pixel(0, 0).0[0], 2.0);
        assert_eq!(image.get_pixel(0, 0).0[1], 1.0);
    }
}
