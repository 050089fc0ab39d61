use colorcloud_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// Each of the four neighbours that falls outside the image contributes a
/// zero value with its regular weight.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [f32; C] {
    let mut pixel = [0.0; C];

    let (cols, rows) = (image.cols() as f32, image.rows() as f32);
    // also rejects NaN coordinates
    let inside = u > -1.0 && v > -1.0 && u < cols && v < rows;
    if !inside {
        return pixel;
    }

    let u0 = u.floor();
    let v0 = v.floor();

    let frac_u = u - u0;
    let frac_v = v - v0;

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let (iu0, iv0) = (u0 as i64, v0 as i64);

    let neighbours = [
        (iu0, iv0, frac_uu * frac_vv),
        (iu0 + 1, iv0, frac_u * frac_vv),
        (iu0, iv0 + 1, frac_uu * frac_v),
        (iu0 + 1, iv0 + 1, frac_u * frac_v),
    ];

    for (iu, iv, w) in neighbours {
        if iu < 0 || iv < 0 || w == 0.0 {
            continue;
        }
        if let Some(src) = image.pixel(iu as usize, iv as usize) {
            for (dst, &s) in pixel.iter_mut().zip(src.iter()) {
                let s: f32 = s.into();
                *dst += s * w;
            }
        }
    }

    pixel
}
