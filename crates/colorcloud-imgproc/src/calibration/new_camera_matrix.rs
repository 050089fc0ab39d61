use super::distortion::{undistort_point_normalized, PolynomialDistortion};
use super::{CalibrationError, CameraIntrinsic};
use colorcloud_image::ImageSize;

/// Number of samples per image side used to trace the undistorted border.
const GRID_SAMPLES: usize = 9;

/// Axis aligned rectangle in normalized camera coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

/// Compute the rectangles inscribed in and circumscribing the undistorted image.
///
/// A `9 x 9` grid of pixels spanning the image is undistorted. The inner
/// rectangle is bounded by the innermost samples of the outer rows and
/// columns; the outer one is the bounding box of all samples.
///
/// # Returns
///
/// The `(inner, outer)` rectangles in normalized coordinates.
pub fn undistort_rectangles(
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
) -> (NormalizedRect, NormalizedRect) {
    let n = GRID_SAMPLES;
    let (w, h) = ((size.width - 1) as f64, (size.height - 1) as f64);

    let (mut ix0, mut ix1, mut iy0, mut iy1) = (f64::MIN, f64::MAX, f64::MIN, f64::MAX);
    let (mut ox0, mut ox1, mut oy0, mut oy1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);

    for gy in 0..n {
        for gx in 0..n {
            let u = gx as f64 * w / (n - 1) as f64;
            let v = gy as f64 * h / (n - 1) as f64;
            let (x, y) = undistort_point_normalized(u, v, intrinsic, distortion);

            ox0 = ox0.min(x);
            ox1 = ox1.max(x);
            oy0 = oy0.min(y);
            oy1 = oy1.max(y);

            if gx == 0 {
                ix0 = ix0.max(x);
            }
            if gx == n - 1 {
                ix1 = ix1.min(x);
            }
            if gy == 0 {
                iy0 = iy0.max(y);
            }
            if gy == n - 1 {
                iy1 = iy1.min(y);
            }
        }
    }

    let inner = NormalizedRect {
        x: ix0,
        y: iy0,
        width: ix1 - ix0,
        height: iy1 - iy0,
    };
    let outer = NormalizedRect {
        x: ox0,
        y: oy0,
        width: ox1 - ox0,
        height: oy1 - oy0,
    };

    (inner, outer)
}

/// Compute the camera matrix of the rectified image.
///
/// `alpha = 0` maps the rectangle inscribed in the undistorted image onto the
/// full output so that every rectified pixel is valid; `alpha = 1` maps the
/// circumscribing rectangle so that every source pixel is kept. Values in
/// between interpolate linearly. The output size equals `size`.
///
/// # Errors
///
/// * `alpha` outside of `[0, 1]`.
/// * An image smaller than 2x2 or a degenerate undistorted region.
/// * Invalid focal lengths.
pub fn get_optimal_new_camera_matrix(
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
    size: &ImageSize,
    alpha: f64,
) -> Result<CameraIntrinsic, CalibrationError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(CalibrationError::InvalidAlpha(alpha));
    }
    if size.width < 2 || size.height < 2 {
        return Err(CalibrationError::ImageTooSmall(size.width, size.height));
    }
    intrinsic.validate()?;

    let (inner, outer) = undistort_rectangles(intrinsic, distortion, size);

    for rect in [inner, outer] {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(CalibrationError::DegenerateRegion(rect.width, rect.height));
        }
    }

    let (w, h) = ((size.width - 1) as f64, (size.height - 1) as f64);

    // projection mapping the inner rectangle to the viewport
    let fx0 = w / inner.width;
    let fy0 = h / inner.height;
    let cx0 = -fx0 * inner.x;
    let cy0 = -fy0 * inner.y;

    // projection mapping the outer rectangle to the viewport
    let fx1 = w / outer.width;
    let fy1 = h / outer.height;
    let cx1 = -fx1 * outer.x;
    let cy1 = -fy1 * outer.y;

    Ok(CameraIntrinsic {
        fx: fx0 * (1.0 - alpha) + fx1 * alpha,
        fy: fy0 * (1.0 - alpha) + fy1 * alpha,
        cx: cx0 * (1.0 - alpha) + cx1 * alpha,
        cy: cy0 * (1.0 - alpha) + cy1 * alpha,
    })
}
