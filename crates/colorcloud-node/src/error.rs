use crate::config::ConfigError;

/// An error type for the fusion node.
#[derive(thiserror::Error, Debug)]
pub enum NodeError {
    /// Error from the image container or a malformed image message.
    #[error(transparent)]
    Image(#[from] colorcloud_image::ImageError),

    /// Error while building the undistortion maps.
    #[error(transparent)]
    Calibration(#[from] colorcloud_imgproc::calibration::CalibrationError),

    /// Error reading a PCD cloud.
    #[error(transparent)]
    Pcd(#[from] colorcloud_3d::io::pcd::PcdError),

    /// Point cloud attributes that do not line up with the points.
    #[error(transparent)]
    PointCloud(#[from] colorcloud_3d::pointcloud::PointCloudError),

    /// Error writing a PLY cloud.
    #[error(transparent)]
    Ply(#[from] colorcloud_3d::io::ply::PlyError),

    /// Error decoding or encoding an image file.
    #[error(transparent)]
    Codec(#[from] image::ImageError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error from the file system.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A publisher could not deliver a message.
    #[error("Failed to publish on '{0}'")]
    Publish(String),
}
