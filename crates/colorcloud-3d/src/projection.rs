use glam::{DMat3, DVec3};

use crate::pointcloud::PointCloud;
use colorcloud_image::Image;

/// The colour given to points that receive no pixel.
pub const NO_COLOUR: [u8; 3] = [0, 0, 0];

/// A 3x3 matrix mapping camera frame points to homogeneous pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionMatrix(DMat3);

impl ProjectionMatrix {
    /// Create the projection from a row-major 3x3 matrix.
    pub fn from_rows(rows: &[[f64; 3]; 3]) -> Self {
        // glam stores columns, transpose the row-major input
        Self(DMat3::from_cols_array_2d(rows).transpose())
    }

    /// The matrix in row-major order.
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        self.0.transpose().to_cols_array_2d()
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &DMat3 {
        &self.0
    }

    /// Apply the matrix to a camera frame point.
    #[inline]
    pub fn apply(&self, camera_point: DVec3) -> DVec3 {
        self.0 * camera_point
    }
}

impl From<DMat3> for ProjectionMatrix {
    fn from(m: DMat3) -> Self {
        Self(m)
    }
}

/// The fixed permutation from the lidar frame to the camera axis convention.
///
/// The camera looks along the lidar `y` axis with its image `y` axis pointing
/// down the lidar `z` axis: `(x, y, z) -> (x, -z, y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisRemap;

impl AxisRemap {
    /// The remap as a rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(0.0, -1.0, 0.0),
        )
    }

    /// Apply the remap to a lidar point.
    #[inline]
    pub fn apply(&self, point: &[f64; 3]) -> DVec3 {
        DVec3::new(point[0], -point[2], point[1])
    }
}

/// Move a lidar point into the camera axis convention, see [`AxisRemap`].
#[inline]
pub fn lidar_to_camera(point: &[f64; 3]) -> DVec3 {
    AxisRemap.apply(point)
}

/// Project a lidar point into continuous pixel coordinates.
///
/// # Returns
///
/// `None` when the point is not in front of the camera, that is when the
/// projected depth is not strictly positive.
pub fn project_point(projection: &ProjectionMatrix, point: &[f64; 3]) -> Option<[f64; 2]> {
    let projected = projection.apply(lidar_to_camera(point));
    (projected.z > 0.0).then(|| [projected.x / projected.z, projected.y / projected.z])
}

/// Project a lidar point onto the integer pixel grid.
///
/// The coordinates are truncated toward zero, so `-0.5` lands on column `0`.
/// Points behind the camera or with non finite coordinates give `None`.
pub fn project_to_pixel(projection: &ProjectionMatrix, point: &[f64; 3]) -> Option<(i64, i64)> {
    let [u, v] = project_point(projection, point)?;
    (u.is_finite() && v.is_finite()).then_some((u as i64, v as i64))
}

/// Read the three channels of pixel `(u, v)` verbatim.
///
/// No channel reordering takes place: whatever order the image bytes are in
/// is the order of the returned colour.
#[inline]
pub fn sample_colour(image: &Image<u8, 3>, u: i64, v: i64) -> Option<[u8; 3]> {
    if u < 0 || v < 0 {
        return None;
    }
    let px = image.pixel(u as usize, v as usize)?;
    Some([px[0], px[1], px[2]])
}

/// Colour of a single lidar point, black unless it lands inside the image.
#[inline]
pub fn colorize_point(
    projection: &ProjectionMatrix,
    image: Option<&Image<u8, 3>>,
    point: &[f64; 3],
) -> [u8; 3] {
    image
        .and_then(|image| {
            let (u, v) = project_to_pixel(projection, point)?;
            sample_colour(image, u, v)
        })
        .unwrap_or(NO_COLOUR)
}

/// Colour every point of a lidar cloud from a rectified camera image.
///
/// The output holds the same points in the same order, each with a colour.
/// Points behind the camera, outside of the image, or colourized without an
/// image are black.
///
/// # Arguments
///
/// * `cloud` - The lidar cloud in the sensor frame.
/// * `image` - The rectified image, if one has been received.
/// * `projection` - The camera projection matrix.
///
/// Example:
///
/// ```
/// use colorcloud_3d::pointcloud::PointCloud;
/// use colorcloud_3d::projection::{colorize_pointcloud, ProjectionMatrix};
/// use colorcloud_image::{Image, ImageSize};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 4, height: 4 }, 7).unwrap();
/// let projection = ProjectionMatrix::from_rows(&[
///     [1.0, 0.0, 2.0],
///     [0.0, 1.0, 2.0],
///     [0.0, 0.0, 1.0],
/// ]);
///
/// let cloud = PointCloud::from_points(vec![[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]]);
/// let coloured = colorize_pointcloud(&cloud, Some(&image), &projection);
///
/// assert_eq!(coloured.colors(), Some(&[[7, 7, 7], [0, 0, 0]][..]));
/// ```
pub fn colorize_pointcloud(
    cloud: &PointCloud,
    image: Option<&Image<u8, 3>>,
    projection: &ProjectionMatrix,
) -> PointCloud {
    let colors = cloud
        .points()
        .iter()
        .map(|point| colorize_point(projection, image, point))
        .collect();

    PointCloud::from_coloured_points(cloud.points().to_vec(), colors)
}
