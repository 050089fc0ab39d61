use crate::parallel;

use super::bilinear::bilinear_interpolation;
use colorcloud_image::{Image, ImageDtype, ImageError};

/// Apply generic geometric transformation to an image.
///
/// For every destination pixel `(u, v)` the source is sampled at
/// `(map_x[v][u], map_y[v][u])`. The source image may have any size; samples
/// outside of it read as zero.
///
/// # Arguments
///
/// * `src` - The input image container with shape (height, width, C).
/// * `dst` - The output image container with shape (height, width, C).
/// * `map_x` - The x coordinates of the pixels to interpolate.
/// * `map_y` - The y coordinates of the pixels to interpolate.
///
/// # Errors
///
/// * The mapx and mapy must have the same size.
/// * The output image must have the same size as the mapx and mapy.
pub fn remap<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    map_x: &Image<f32, 1>,
    map_y: &Image<f32, 1>,
) -> Result<(), ImageError> {
    if map_x.size() != map_y.size() {
        return Err(ImageError::InvalidImageSize(
            map_x.width(),
            map_x.height(),
            map_y.width(),
            map_y.height(),
        ));
    }

    if dst.size() != map_x.size() {
        return Err(ImageError::InvalidImageSize(
            map_x.width(),
            map_x.height(),
            dst.width(),
            dst.height(),
        ));
    }

    // parallelize the remap operation by rows
    parallel::par_iter_rows_resample(dst, map_x, map_y, |&x, &y, dst_pixel| {
        let pixel = bilinear_interpolation(src, x, y);
        dst_pixel
            .iter_mut()
            .zip(pixel.iter())
            .for_each(|(d, &p)| *d = T::from_f32(p));
    });

    Ok(())
}
