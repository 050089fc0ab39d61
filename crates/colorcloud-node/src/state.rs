use colorcloud_3d::projection::{colorize_pointcloud, ProjectionMatrix};
use colorcloud_image::Image;
use colorcloud_imgproc::calibration::{distortion::PolynomialDistortion, CameraIntrinsic};
use colorcloud_imgproc::undistort::UndistortionMap;

use crate::config::FusionConfig;
use crate::error::NodeError;
use crate::messages::{PointCloudMessage, RawImage};

/// Calibration and latest image, owned by the node and shared by both handlers.
#[derive(Debug)]
pub struct FusionState {
    undistortion: UndistortionMap,
    projection: ProjectionMatrix,
    frame_id: String,
    rectified: Option<Image<u8, 3>>,
}

impl FusionState {
    /// Create the state with an uninitialized undistortion map and no image.
    pub fn new(
        intrinsic: CameraIntrinsic,
        distortion: PolynomialDistortion,
        alpha: f64,
        projection: ProjectionMatrix,
        frame_id: impl Into<String>,
    ) -> Self {
        Self {
            undistortion: UndistortionMap::new(intrinsic, distortion, alpha),
            projection,
            frame_id: frame_id.into(),
            rectified: None,
        }
    }

    /// Create the state from a validated configuration.
    pub fn from_config(config: &FusionConfig) -> Result<Self, NodeError> {
        config.validate()?;
        Ok(Self::new(
            config.camera.intrinsic(),
            config.camera.polynomial_distortion()?,
            config.alpha,
            config.projection_matrix(),
            config.frame_id.clone(),
        ))
    }

    /// The undistortion map.
    pub fn undistortion(&self) -> &UndistortionMap {
        &self.undistortion
    }

    /// The latest rectified image, if any image was handled.
    pub fn rectified(&self) -> Option<&Image<u8, 3>> {
        self.rectified.as_ref()
    }

    /// The projection matrix.
    pub fn projection(&self) -> &ProjectionMatrix {
        &self.projection
    }

    /// Rectify a raw image and keep it for colouring.
    ///
    /// The undistortion maps are built from the first image handled. The
    /// returned message keeps the input header and is tagged `rgb8`.
    ///
    /// # Errors
    ///
    /// Malformed messages and map failures. The stored image is left as is.
    pub fn handle_image(&mut self, msg: &RawImage) -> Result<RawImage, NodeError> {
        let image = msg.to_image()?;
        let rectified = self.undistortion.rectify(&image)?;

        let out = RawImage::from_rgb8(msg.header.clone(), &rectified);
        self.rectified = Some(rectified);

        Ok(out)
    }

    /// Colour a cloud with the latest rectified image.
    ///
    /// The output keeps the input header with the frame id replaced by the
    /// configured one. Without an image every point is black.
    pub fn handle_cloud(&self, msg: &PointCloudMessage) -> PointCloudMessage {
        if self.rectified.is_none() {
            log::warn!(
                "No rectified image yet, cloud {} is left black",
                msg.header.seq
            );
        }

        let cloud = colorize_pointcloud(&msg.cloud, self.rectified.as_ref(), &self.projection);

        let mut header = msg.header.clone();
        header.frame_id.clone_from(&self.frame_id);

        PointCloudMessage { header, cloud }
    }
}
