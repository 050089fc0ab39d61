use std::path::Path;

use serde::{Deserialize, Serialize};

use colorcloud_3d::projection::ProjectionMatrix;
use colorcloud_imgproc::calibration::{
    distortion::PolynomialDistortion, CalibrationError, CameraIntrinsic,
};

/// An error type for the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for [`FusionConfig`].
    #[error("Failed to parse config")]
    Parse(#[from] serde_json::Error),

    /// The camera calibration is not usable.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// A projection matrix entry is NaN or infinite.
    #[error("projection matrix entry ({0}, {1}) is not finite")]
    NonFiniteProjection(usize, usize),
}

/// Focal length of the reference `usb_cam` calibration.
///
/// The reference matrices hold single precision floats, so the focal length
/// is the `f32` nearest to `754.53892599834842`, widened back to `f64`.
pub const REFERENCE_FOCAL: f64 = 754.538_925_998_348_42_f32 as f64;

/// Intrinsic calibration of the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Focal length along x, in pixels.
    pub fx: f64,
    /// Focal length along y, in pixels.
    pub fy: f64,
    /// Principal point x.
    pub cx: f64,
    /// Principal point y.
    pub cy: f64,
    /// Distortion coefficients `(k1, k2, p1, p2[, k3[, k4, k5, k6]])`.
    pub distortion: Vec<f64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fx: REFERENCE_FOCAL,
            fy: REFERENCE_FOCAL,
            cx: 319.5,
            cy: 239.5,
            distortion: vec![
                5.2038044809064208e-03,
                1.5288890999953295e-01,
                0.0,
                0.0,
                -1.7854072082302619e+00,
            ],
        }
    }
}

impl CameraConfig {
    /// The pinhole parameters.
    pub fn intrinsic(&self) -> CameraIntrinsic {
        CameraIntrinsic {
            fx: self.fx,
            fy: self.fy,
            cx: self.cx,
            cy: self.cy,
        }
    }

    /// The lens distortion model.
    pub fn polynomial_distortion(&self) -> Result<PolynomialDistortion, ConfigError> {
        Ok(PolynomialDistortion::from_coeffs(&self.distortion)?)
    }
}

/// Topic names of the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topics {
    /// Raw camera images.
    pub image_raw: String,
    /// Lidar clouds.
    pub points: String,
    /// Rectified images.
    pub rect_image: String,
    /// Coloured clouds.
    pub colour_cloud: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            image_raw: "/usb_cam/image_raw".to_string(),
            points: "/velodyne_points".to_string(),
            rect_image: "rect_image".to_string(),
            colour_cloud: "colour_cloud".to_string(),
        }
    }
}

/// Startup configuration of the fusion node.
///
/// Every field is optional in the JSON file and falls back to the calibration
/// of the reference camera and lidar rig.
///
/// ```
/// use colorcloud_node::FusionConfig;
///
/// let config = FusionConfig::from_json_str(r#"{ "alpha": 0.5, "camera": { "cx": 320.0 } }"#).unwrap();
/// assert_eq!(config.alpha, 0.5);
/// assert_eq!(config.camera.cx, 320.0);
/// assert_eq!(config.frame_id, "velodyne");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Camera intrinsics and distortion.
    pub camera: CameraConfig,
    /// Row-major lidar to pixel projection; the camera matrix when omitted.
    pub projection: Option<[[f64; 3]; 3]>,
    /// Free scaling of the rectified camera matrix, `0` keeps valid pixels only.
    pub alpha: f64,
    /// Frame id stamped on coloured clouds.
    pub frame_id: String,
    /// Topic names.
    pub topics: Topics,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            projection: None,
            alpha: 0.0,
            frame_id: "velodyne".to_string(),
            topics: Topics::default(),
        }
    }
}

impl FusionConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The projection matrix, defaulting to the camera matrix.
    pub fn projection_matrix(&self) -> ProjectionMatrix {
        let rows = self
            .projection
            .unwrap_or_else(|| self.camera.intrinsic().matrix());
        ProjectionMatrix::from_rows(&rows)
    }

    /// Check the configuration before any message is handled.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Calibration`] for a zero or non finite focal length,
    ///   an `alpha` outside of `[0, 1]` or a distortion vector that is not
    ///   4 to 8 long.
    /// * [`ConfigError::NonFiniteProjection`] for a bad projection entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.intrinsic().validate()?;
        self.camera.polynomial_distortion()?;

        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(CalibrationError::InvalidAlpha(self.alpha).into());
        }

        if let Some(rows) = &self.projection {
            for (r, row) in rows.iter().enumerate() {
                if let Some(c) = row.iter().position(|v| !v.is_finite()) {
                    return Err(ConfigError::NonFiniteProjection(r, c));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_reference_rig() -> Result<(), ConfigError> {
        let config = FusionConfig::from_json_str("{}")?;
        assert_eq!(config, FusionConfig::default());
        assert_eq!(config.topics.image_raw, "/usb_cam/image_raw");
        assert_eq!(config.topics.points, "/velodyne_points");
        assert_eq!(config.topics.rect_image, "rect_image");
        assert_eq!(config.topics.colour_cloud, "colour_cloud");
        assert_eq!(config.alpha, 0.0);
        config.validate()?;

        let distortion = config.camera.polynomial_distortion()?;
        assert_eq!(distortion.k1, 5.2038044809064208e-03);
        assert_eq!(distortion.k3, -1.7854072082302619e+00);
        assert_eq!(distortion.p1, 0.0);
        Ok(())
    }

    #[test]
    fn reference_focal_is_single_precision() {
        assert_eq!(REFERENCE_FOCAL, 754.5389404296875);
        assert_eq!(REFERENCE_FOCAL as f32, 754.538_925_998_348_42_f32);
        assert_ne!(REFERENCE_FOCAL, 754.538_925_998_348_42);

        let camera = CameraConfig::default();
        assert_eq!((camera.fx, camera.fy), (REFERENCE_FOCAL, REFERENCE_FOCAL));
    }

    #[test]
    fn projection_defaults_to_camera_matrix() -> Result<(), ConfigError> {
        let config = FusionConfig::default();
        assert_eq!(
            config.projection_matrix().to_rows(),
            [
                [754.5389404296875, 0.0, 319.5],
                [0.0, 754.5389404296875, 239.5],
                [0.0, 0.0, 1.0],
            ]
        );

        let config = FusionConfig::from_json_str(
            r#"{ "projection": [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]] }"#,
        )?;
        assert_eq!(config.projection_matrix().to_rows()[1], [0.0, 2.0, 0.0]);
        Ok(())
    }

    #[test]
    fn file_roundtrip() -> Result<(), ConfigError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fusion.json");
        let mut config = FusionConfig::default();
        config.frame_id = "lidar_top".to_string();
        config.topics.points = "/points".to_string();
        std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

        let read = FusionConfig::from_file(&path)?;
        assert_eq!(read.frame_id, "lidar_top");
        assert_eq!(read.topics, config.topics);
        assert_eq!(read.camera.distortion.len(), 5);
        assert_eq!(read.projection, None);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        let bad_alpha = FusionConfig {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(ConfigError::Calibration(CalibrationError::InvalidAlpha(_)))
        ));

        let mut zero_focal = FusionConfig::default();
        zero_focal.camera.fx = 0.0;
        assert!(zero_focal.validate().is_err());

        let mut short = FusionConfig::default();
        short.camera.distortion = vec![0.1, 0.2];
        assert!(matches!(
            short.validate(),
            Err(ConfigError::Calibration(
                CalibrationError::InvalidDistortionLength(2)
            ))
        ));

        let nan_projection = FusionConfig {
            projection: Some([[1.0, 0.0, 0.0], [0.0, f64::NAN, 0.0], [0.0, 0.0, 1.0]]),
            ..Default::default()
        };
        assert!(matches!(
            nan_projection.validate(),
            Err(ConfigError::NonFiniteProjection(1, 1))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            FusionConfig::from_json_str(r#"{ "alpha": "zero" }"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
