use crate::error::{Error, Result};
use image::{Rgb, Rgb32FImage, RgbImage};
use std::path::Path;

/// Widens an 8-bit image to `f32` samples without rescaling (0..=255 stays 0..=255).
pub fn to_float(image: &RgbImage) -> Rgb32FImage {
    let (width, height) = image.dimensions();
    Rgb32FImage::from_fn(width, height, |x, y| Rgb(image.get_pixel(x, y).0.map(f32::from)))
}

/// Narrows `f32` samples back to `u8` by truncation, saturating at 0 and 255.
pub fn to_u8(image: &Rgb32FImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| Rgb(image.get_pixel(x, y).0.map(|v| v as u8)))
}

/// Writes an RGB image, encoded according to the path's extension.
pub fn save<P: AsRef<Path>>(path: P, image: &RgbImage) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_white_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("white_file.png");
        let image = RgbImage::from_pixel(50, 30, Rgb([255, 255, 255]));

        save(&path, &image).expect("Error Saving File.");

        let reloaded = image::open(&path).expect("reload").to_rgb8();
        assert_eq!(reloaded, image);
    }

    #[test]
    fn save_gradient_file_non_square() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("gradient_file.png");
        let mut image = RgbImage::new(40, 10);
        let mut intensity = 0u8;
        for pixel in image.pixels_mut() {
            *pixel = Rgb([intensity, intensity, intensity]);
            intensity = intensity.wrapping_add(1);
        }

        save(&path, &image).expect("Error Saving File.");

        let reloaded = image::open(&path).expect("reload").to_rgb8();
        assert_eq!(reloaded.dimensions(), (40, 10));
        assert_eq!(reloaded, image);
    }

    #[test]
    fn save_picks_format_from_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("figure.bmp");
        let image = RgbImage::from_pixel(3, 2, Rgb([12, 34, 56]));

        save(&path, &image).expect("Error Saving File.");

        let format = image::ImageFormat::from_path(&path).expect("known extension");
        assert_eq!(format, image::ImageFormat::Bmp);
        assert_eq!(image::open(&path).expect("reload").to_rgb8(), image);
    }

    #[test]
    fn save_without_extension_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = save(dir.path().join("figure"), &RgbImage::new(2, 2)).unwrap_err();
        assert!(matches!(err, Error::ImageSave { .. }));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let image = RgbImage::new(2, 2);
        let err = save("/no/such/dir/out.png", &image).unwrap_err();
        assert!(matches!(err, Error::ImageSave { .. }));
    }

    #[test]
    fn float_round_trip_truncates() {
        let mut float = to_float(&RgbImage::from_pixel(1, 1, Rgb([10, 20, 30])));
        assert_eq!(float.get_pixel(0, 0).0, [10.0, 20.0, 30.0]);

        float.put_pixel(0, 0, Rgb([10.9, -3.0, 300.0]));
        assert_eq!(to_u8(&float).get_pixel(0, 0).0, [10, 0, 255]);
    }
}
