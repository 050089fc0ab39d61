/// image distortion module.
pub mod distortion;

/// optimal new camera matrix for undistortion.
pub mod new_camera_matrix;

/// An error type for the calibration module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CalibrationError {
    /// The free scaling parameter is outside of `[0, 1]`.
    #[error("alpha must be in [0, 1], got {0}")]
    InvalidAlpha(f64),

    /// The image is too small to sample an undistortion grid.
    #[error("image of {0}x{1} is too small, minimum is 2x2")]
    ImageTooSmall(usize, usize),

    /// The undistorted image border collapsed to an empty rectangle.
    #[error("undistorted image region is degenerate ({0} x {1})")]
    DegenerateRegion(f64, f64),

    /// The distortion vector does not have a supported length.
    #[error("expected 4 to 8 distortion coefficients, got {0}")]
    InvalidDistortionLength(usize),

    /// The focal lengths cannot be inverted.
    #[error("invalid focal length fx={0} fy={1}")]
    InvalidFocalLength(f64, f64),

    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] colorcloud_image::ImageError),
}

/// Represents the instrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

impl CameraIntrinsic {
    /// Extract the parameters from a row-major 3x3 camera matrix.
    ///
    /// Skew and the last row are ignored.
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> Self {
        Self {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        }
    }

    /// The row-major 3x3 camera matrix.
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Check that the focal lengths are finite and non-zero.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let valid = |f: f64| f.is_finite() && f != 0.0;
        if !valid(self.fx) || !valid(self.fy) || !self.cx.is_finite() || !self.cy.is_finite() {
            return Err(CalibrationError::InvalidFocalLength(self.fx, self.fy));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_roundtrip() {
        let intrinsic = CameraIntrinsic {
            fx: 754.5,
            fy: 750.0,
            cx: 319.5,
            cy: 239.5,
        };
        let k = intrinsic.matrix();
        assert_eq!(k[0], [754.5, 0.0, 319.5]);
        assert_eq!(k[2], [0.0, 0.0, 1.0]);
        assert_eq!(CameraIntrinsic::from_matrix(&k), intrinsic);
    }

    #[test]
    fn validate_focal_length() {
        let mut intrinsic = CameraIntrinsic {
            fx: 1.0,
            fy: 1.0,
            cx: 0.0,
            cy: 0.0,
        };
        assert!(intrinsic.validate().is_ok());
        intrinsic.fy = 0.0;
        assert_eq!(
            intrinsic.validate(),
            Err(CalibrationError::InvalidFocalLength(1.0, 0.0))
        );
    }
}
