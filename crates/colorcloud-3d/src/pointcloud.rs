/// A point cloud with points, colors, and normals.
///
/// Colors and normals, when present, hold exactly one entry per point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
    // The normals of the points.
    normals: Option<Vec<[f64; 3]>>,
}

/// Error types for the point cloud container.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointCloudError {
    /// Per point attribute with a different number of entries than points.
    #[error("Expected one {0} per point, got {1} for {2} points")]
    AttributeLength(&'static str, usize, usize),
}

impl PointCloud {
    /// Create a new point cloud from points, colors (optional), and normals (optional).
    ///
    /// # Errors
    ///
    /// Colors or normals that do not hold one entry per point.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointCloudError> {
        if let Some(colors) = &colors {
            check_length("color", colors.len(), points.len())?;
        }
        if let Some(normals) = &normals {
            check_length("normal", normals.len(), points.len())?;
        }
        Ok(Self {
            points,
            colors,
            normals,
        })
    }

    /// Create a point cloud made of positions only.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points,
            colors: None,
            normals: None,
        }
    }

    // callers build `colors` from `points`, one entry each
    pub(crate) fn from_coloured_points(points: Vec<[f64; 3]>, colors: Vec<[u8; 3]>) -> Self {
        Self {
            points,
            colors: Some(colors),
            normals: None,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }
}

fn check_length(attribute: &'static str, len: usize, points: usize) -> Result<(), PointCloudError> {
    if len == points {
        Ok(())
    } else {
        Err(PointCloudError::AttributeLength(attribute, len, points))
    }
}
