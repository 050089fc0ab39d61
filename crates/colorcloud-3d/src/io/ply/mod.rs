mod parser;
mod properties;
mod writer;

pub use parser::*;
pub use properties::*;
pub use writer::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlyError {
    /// Failed to read or write PLY file
    #[error("Failed to read PLY file")]
    Io(#[from] std::io::Error),

    /// Attributes that do not line up with the points
    #[error(transparent)]
    PointCloud(#[from] crate::pointcloud::PointCloudError),

    /// Unsupported PLY property
    #[error("Unsupported PLY property")]
    UnsupportedProperty,

    /// Missing a required vertex property
    #[error("Missing PLY vertex property: {0}")]
    MissingProperty(&'static str),

    /// Vertex count above the supported limit
    #[error("PLY vertex count {0} exceeds the limit of {1}")]
    TooManyVertices(usize, usize),
}
