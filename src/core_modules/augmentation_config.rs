// THEORY:
// `AugmentationConfig` is the immutable description of *how much* randomness the
// augmenter is allowed to inject. It holds only ranges and flags, never a draw.
// Every numeric range is symmetric around "no change": a rotation range of 10
// means angles are drawn from [-10, 10] degrees, a zoom range of 0.1 means
// zoom factors are drawn from [0.9, 1.1].
//
// The `Default` value is the do-nothing configuration (every range zero, every
// flag off), so a partially specified JSON file only enables what it names.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How samples that fall outside the source image are filled by the affine warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Repeat the nearest edge pixel (`aaaa|abcd|dddd`).
    #[default]
    Nearest,
    /// Use `cval` for every sample outside the image.
    Constant,
    /// Mirror about the edge (`dcba|abcd|dcba`).
    Reflect,
    /// Tile the image (`abcd|abcd|abcd`).
    Wrap,
}

/// Ranges for each random perturbation. Constructed once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AugmentationConfig {
    /// Maximum rotation in degrees; angles are drawn from `[-r, r]`.
    pub rotation_range: f64,
    /// Maximum horizontal shift as a fraction of the image width.
    pub width_shift_range: f64,
    /// Maximum vertical shift as a fraction of the image height.
    pub height_shift_range: f64,
    /// Maximum shear angle in radians.
    pub shear_range: f64,
    /// Zoom factors are drawn independently per axis from `[1 - z, 1 + z]`.
    pub zoom_range: f64,
    /// Maximum intensity added to every channel.
    pub channel_shift_range: f64,
    /// Mirror left/right with probability 0.5.
    pub horizontal_flip: bool,
    /// Mirror top/bottom with probability 0.5.
    pub vertical_flip: bool,
    pub fill_mode: FillMode,
    /// Fill value used when `fill_mode` is `Constant`.
    pub cval: f32,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            rotation_range: 0.0,
            width_shift_range: 0.0,
            height_shift_range: 0.0,
            shear_range: 0.0,
            zoom_range: 0.0,
            channel_shift_range: 0.0,
            horizontal_flip: false,
            vertical_flip: false,
            fill_mode: FillMode::Nearest,
            cval: 0.0,
        }
    }
}

impl AugmentationConfig {
    /// The configuration used by the preview binary when no file is given.
    pub fn demo() -> Self {
        Self {
            rotation_range: 10.0,
            width_shift_range: 0.1,
            height_shift_range: 0.1,
            shear_range: 0.15,
            zoom_range: 0.1,
            channel_shift_range: 10.0,
            horizontal_flip: true,
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects ranges that cannot be sampled from or would produce degenerate images.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("rotation_range", self.rotation_range),
            ("width_shift_range", self.width_shift_range),
            ("height_shift_range", self.height_shift_range),
            ("shear_range", self.shear_range),
            ("zoom_range", self.zoom_range),
            ("channel_shift_range", self.channel_shift_range),
        ];
        for (name, value) in ranges {
            if !value.is_finite() {
                return Err(Error::invalid(name, format!("must be finite, got {value}")));
            }
            if value < 0.0 {
                return Err(Error::invalid(name, format!("must be non-negative, got {value}")));
            }
            // Draws span [-value, value]; that width must itself be representable.
            if !(2.0 * value).is_finite() {
                return Err(Error::invalid(name, format!("span of {value} overflows")));
            }
        }
        // A zoom factor of zero or below collapses the image.
        if self.zoom_range >= 1.0 {
            return Err(Error::invalid(
                "zoom_range",
                format!("must be below 1.0, got {}", self.zoom_range),
            ));
        }
        if !self.cval.is_finite() {
            return Err(Error::invalid("cval", format!("must be finite, got {}", self.cval)));
        }
        Ok(())
    }

    /// Inclusive bounds of the per-axis zoom factor.
    pub fn zoom_bounds(&self) -> (f64, f64) {
        (1.0 - self.zoom_range, 1.0 + self.zoom_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn demo_config_is_valid() {
        let config = AugmentationConfig::demo();
        config.validate().expect("demo config should validate");
        assert_eq!(config.rotation_range, 10.0);
        assert!(config.horizontal_flip);
        assert!(!config.vertical_flip);
        assert_eq!(config.fill_mode, FillMode::Nearest);
    }

    #[test]
    fn default_config_does_nothing() {
        let config = AugmentationConfig::default();
        assert_eq!(config.zoom_bounds(), (1.0, 1.0));
        assert!(!config.horizontal_flip);
        assert_eq!(config.channel_shift_range, 0.0);
    }

    #[test]
    fn rejects_negative_range() {
        let config = AugmentationConfig {
            shear_range: -0.1,
            ..AugmentationConfig::default()
        };
        match config.validate() {
            Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, "shear_range"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn rejects_collapsing_zoom() {
        let config = AugmentationConfig {
            zoom_range: 1.0,
            ..AugmentationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nan_range() {
        let config = AugmentationConfig {
            rotation_range: f64::NAN,
            ..AugmentationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overflowing_range() {
        let config = AugmentationConfig {
            channel_shift_range: 1e308,
            ..AugmentationConfig::default()
        };
        match config.validate() {
            Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, "channel_shift_range"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn misspelled_key_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "rotaton_range": 25.0 }}"#).expect("write");

        let err = AugmentationConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "rotation_range": 25.0, "fill_mode": "reflect" }}"#).expect("write");

        let config = AugmentationConfig::from_json_file(file.path()).expect("parse");
        assert_eq!(config.rotation_range, 25.0);
        assert_eq!(config.fill_mode, FillMode::Reflect);
        assert_eq!(config.zoom_range, 0.0);
        assert!(!config.horizontal_flip);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");

        let err = AugmentationConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AugmentationConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
