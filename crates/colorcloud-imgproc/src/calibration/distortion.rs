use super::{CalibrationError, CameraIntrinsic};
use crate::interpolation::grid::meshgrid_from_fn;
use colorcloud_image::{Image, ImageSize};

/// Number of fixed-point iterations used to invert the distortion model.
pub const UNDISTORT_ITERATIONS: usize = 5;

/// Represents the polynomial distortion parameters of a camera
///
/// Radial distortion is the rational model
/// `(1 + k1 r² + k2 r⁴ + k3 r⁶) / (1 + k4 r² + k5 r⁴ + k6 r⁶)`;
/// `p1` and `p2` are the tangential terms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
    /// The fourth radial distortion coefficient
    pub k4: f64,
    /// The fifth radial distortion coefficient
    pub k5: f64,
    /// The sixth radial distortion coefficient
    pub k6: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
}

impl PolynomialDistortion {
    /// Build the distortion from a coefficient vector in the usual
    /// `(k1, k2, p1, p2[, k3[, k4, k5, k6]])` order.
    ///
    /// Missing trailing coefficients are zero.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::InvalidDistortionLength`] unless 4 to 8 values are given.
    pub fn from_coeffs(coeffs: &[f64]) -> Result<Self, CalibrationError> {
        if !(4..=8).contains(&coeffs.len()) {
            return Err(CalibrationError::InvalidDistortionLength(coeffs.len()));
        }
        let at = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
        Ok(Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
            k4: at(5),
            k5: at(6),
            k6: at(7),
        })
    }

    /// The coefficients in `(k1, k2, p1, p2, k3, k4, k5, k6)` order.
    pub fn coeffs(&self) -> [f64; 8] {
        [
            self.k1, self.k2, self.p1, self.p2, self.k3, self.k4, self.k5, self.k6,
        ]
    }
}

/// Distort a point given in normalized camera coordinates.
pub fn distort_point_normalized(x: f64, y: f64, distortion: &PolynomialDistortion) -> (f64, f64) {
    let d = distortion;

    // calculate the radial distance
    let r2 = x * x + y * y;

    // radial distortion
    let kr = (1.0 + ((d.k3 * r2 + d.k2) * r2 + d.k1) * r2)
        / (1.0 + ((d.k6 * r2 + d.k5) * r2 + d.k4) * r2);

    // tangential distortion
    let xd = x * kr + 2.0 * d.p1 * x * y + d.p2 * (r2 + 2.0 * x * x);
    let yd = y * kr + d.p1 * (r2 + 2.0 * y * y) + 2.0 * d.p2 * x * y;

    (xd, yd)
}

/// Distort a point using polynomial distortion
///
/// # Arguments
///
/// * `x` - The x coordinate of the point
/// * `y` - The y coordinate of the point
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// The pixel coordinates of the distorted point
pub fn distort_point_polynomial(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);

    let (xd, yd) = distort_point_normalized((x - cx) / fx, (y - cy) / fy, distortion);

    (fx * xd + cx, fy * yd + cy)
}

/// Remove the distortion of a pixel, returning normalized camera coordinates.
///
/// The inverse of the distortion model has no closed form; it is approximated
/// with [`UNDISTORT_ITERATIONS`] fixed-point iterations starting from the
/// distorted coordinate.
pub fn undistort_point_normalized(
    u: f64,
    v: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let d = distortion;

    let x0 = (u - intrinsic.cx) / intrinsic.fx;
    let y0 = (v - intrinsic.cy) / intrinsic.fy;

    let (mut x, mut y) = (x0, y0);

    for _ in 0..UNDISTORT_ITERATIONS {
        let r2 = x * x + y * y;
        let icdist = (1.0 + ((d.k6 * r2 + d.k5) * r2 + d.k4) * r2)
            / (1.0 + ((d.k3 * r2 + d.k2) * r2 + d.k1) * r2);
        if icdist < 0.0 {
            // the model folds over here, keep the distorted estimate
            return (x0, y0);
        }
        let delta_x = 2.0 * d.p1 * x * y + d.p2 * (r2 + 2.0 * x * x);
        let delta_y = d.p1 * (r2 + 2.0 * y * y) + 2.0 * d.p2 * x * y;
        x = (x0 - delta_x) * icdist;
        y = (y0 - delta_y) * icdist;
    }

    (x, y)
}

/// Generate the undistort and rectify map for a polynomial distortion model
///
/// Each destination pixel is normalized with `new_intrinsic`, distorted, and
/// projected back with `intrinsic`, so the map holds the source coordinate to
/// sample for every rectified pixel.
///
/// # Arguments
///
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `new_intrinsic` - The intrinsic parameters of the rectified image
/// * `distortion` - The distortion parameters of the camera
/// * `size` - The size of the rectified image
///
/// # Returns
///
/// * `map_x` - The x map for undistorting and rectifying the image
/// * `map_y` - The y map for undistorting and rectifying the image
pub fn generate_correction_map_polynomial(
    intrinsic: &CameraIntrinsic,
    new_intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
) -> Result<(Image<f32, 1>, Image<f32, 1>), CalibrationError> {
    intrinsic.validate()?;
    new_intrinsic.validate()?;

    let (ifx, ify) = (1.0 / new_intrinsic.fx, 1.0 / new_intrinsic.fy);
    let (ncx, ncy) = (new_intrinsic.cx, new_intrinsic.cy);

    let maps = meshgrid_from_fn(size.width, size.height, |u, v| {
        let x = (u as f64 - ncx) * ifx;
        let y = (v as f64 - ncy) * ify;
        let (xd, yd) = distort_point_normalized(x, y, distortion);
        let xsrc = intrinsic.fx * xd + intrinsic.cx;
        let ysrc = intrinsic.fy * yd + intrinsic.cy;
        (xsrc as f32, ysrc as f32)
    })?;

    Ok(maps)
}
