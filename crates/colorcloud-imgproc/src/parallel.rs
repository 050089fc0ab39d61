use rayon::prelude::*;

use colorcloud_image::Image;

/// Apply a function to each pixel for grid sampling in parallel.
///
/// The rows of `dst`, `map_x` and `map_y` are visited together; the caller
/// guarantees the three share the same size.
pub fn par_iter_rows_resample<T, const C: usize>(
    dst: &mut Image<T, C>,
    map_x: &Image<f32, 1>,
    map_y: &Image<f32, 1>,
    f: impl Fn(&f32, &f32, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let cols = dst.cols();
    if cols == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(map_x.as_slice().par_chunks_exact(cols))
        .zip(map_y.as_slice().par_chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (x, y))| {
                    f(x, y, dst_pixel);
                });
        });
}

/// Fill two single channel grids in parallel, row by row.
///
/// `f` receives the `(col, row)` of each cell and returns the values for
/// `map_x` and `map_y` at that cell.
pub fn par_fill_grid2(
    map_x: &mut Image<f32, 1>,
    map_y: &mut Image<f32, 1>,
    f: impl Fn(usize, usize) -> (f32, f32) + Send + Sync,
) {
    let cols = map_x.cols();
    if cols == 0 {
        return;
    }

    map_x
        .as_slice_mut()
        .par_chunks_exact_mut(cols)
        .zip(map_y.as_slice_mut().par_chunks_exact_mut(cols))
        .enumerate()
        .for_each(|(row, (xrow, yrow))| {
            xrow.iter_mut()
                .zip(yrow.iter_mut())
                .enumerate()
                .for_each(|(col, (x, y))| {
                    (*x, *y) = f(col, row);
                });
        });
}
