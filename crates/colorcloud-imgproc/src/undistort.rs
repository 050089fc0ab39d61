use std::sync::OnceLock;

use crate::calibration::{
    distortion::{generate_correction_map_polynomial, PolynomialDistortion},
    new_camera_matrix::get_optimal_new_camera_matrix,
    CalibrationError, CameraIntrinsic,
};
use crate::interpolation::remap;
use colorcloud_image::{Image, ImageDtype, ImageError, ImageSize};

/// Remap tables that rectify images of one camera.
#[derive(Debug, Clone)]
pub struct RectifyMaps {
    /// The size the maps were built for, equal to the rectified image size.
    pub size: ImageSize,
    /// The camera matrix of the rectified image.
    pub new_intrinsic: CameraIntrinsic,
    /// Source x coordinate for every rectified pixel.
    pub map_x: Image<f32, 1>,
    /// Source y coordinate for every rectified pixel.
    pub map_y: Image<f32, 1>,
}

impl RectifyMaps {
    /// Build the maps for images of `size`.
    ///
    /// The rectified camera matrix is chosen with
    /// [`get_optimal_new_camera_matrix`] using the free scaling `alpha`.
    pub fn new(
        intrinsic: &CameraIntrinsic,
        distortion: &PolynomialDistortion,
        size: ImageSize,
        alpha: f64,
    ) -> Result<Self, CalibrationError> {
        let new_intrinsic = get_optimal_new_camera_matrix(intrinsic, distortion, &size, alpha)?;
        let (map_x, map_y) =
            generate_correction_map_polynomial(intrinsic, &new_intrinsic, distortion, &size)?;

        Ok(Self {
            size,
            new_intrinsic,
            map_x,
            map_y,
        })
    }

    /// Rectify `src` with bilinear interpolation.
    ///
    /// The output always has the size of the maps; a source of a different
    /// size is sampled as is and areas outside of it come out black.
    pub fn rectify<T: ImageDtype, const C: usize>(
        &self,
        src: &Image<T, C>,
    ) -> Result<Image<T, C>, ImageError> {
        let mut dst = Image::from_size_val(self.size, T::default())?;
        remap(src, &mut dst, &self.map_x, &self.map_y)?;
        Ok(dst)
    }
}

/// The undistortion maps of a camera, built lazily from the first image seen.
///
/// The map goes through two states only: uninitialized until
/// [`UndistortionMap::get_or_init`] succeeds once, ready afterwards. Once ready
/// it is never rebuilt, whatever size later images have.
#[derive(Debug)]
pub struct UndistortionMap {
    intrinsic: CameraIntrinsic,
    distortion: PolynomialDistortion,
    alpha: f64,
    maps: OnceLock<RectifyMaps>,
}

impl UndistortionMap {
    /// Create an uninitialized map for the given camera.
    pub fn new(intrinsic: CameraIntrinsic, distortion: PolynomialDistortion, alpha: f64) -> Self {
        Self {
            intrinsic,
            distortion,
            alpha,
            maps: OnceLock::new(),
        }
    }

    /// Whether the maps have been built.
    pub fn is_ready(&self) -> bool {
        self.maps.get().is_some()
    }

    /// The maps, if already built.
    pub fn get(&self) -> Option<&RectifyMaps> {
        self.maps.get()
    }

    /// Return the maps, building them for `size` if this is the first call.
    ///
    /// A failed build leaves the map uninitialized. When two callers race,
    /// the first stored result wins and the other one is dropped.
    pub fn get_or_init(&self, size: ImageSize) -> Result<&RectifyMaps, CalibrationError> {
        if let Some(maps) = self.maps.get() {
            return Ok(maps);
        }

        log::info!("Initialising camera mapping for {size}");
        let maps = RectifyMaps::new(&self.intrinsic, &self.distortion, size, self.alpha)?;
        log::debug!("Rectified camera matrix: {:?}", maps.new_intrinsic);

        Ok(self.maps.get_or_init(|| maps))
    }

    /// Rectify an image, building the maps from its size on first use.
    pub fn rectify<T: ImageDtype, const C: usize>(
        &self,
        src: &Image<T, C>,
    ) -> Result<Image<T, C>, CalibrationError> {
        let maps = self.get_or_init(src.size())?;
        Ok(maps.rectify(src)?)
    }
}
