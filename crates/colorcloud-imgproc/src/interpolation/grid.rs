use crate::parallel;
use colorcloud_image::{Image, ImageError, ImageSize};

/// Create a pair of coordinate maps by evaluating `f` on every cell.
///
/// # Arguments
///
/// * `cols` - The number of columns indicating the width of the grid
/// * `rows` - The number of rows indicating the height of the grid
/// * `f` - Maps the `(col, row)` coordinate of a cell to its `(x, y)` values
///
/// # Returns
///
/// A tuple of single channel images of shape (rows, cols) holding the x and y values.
pub fn meshgrid_from_fn(
    cols: usize,
    rows: usize,
    f: impl Fn(usize, usize) -> (f32, f32) + Send + Sync,
) -> Result<(Image<f32, 1>, Image<f32, 1>), ImageError> {
    let size = ImageSize {
        width: cols,
        height: rows,
    };
    let mut map_x = Image::from_size_val(size, 0.0)?;
    let mut map_y = Image::from_size_val(size, 0.0)?;

    parallel::par_fill_grid2(&mut map_x, &mut map_y, f);

    Ok((map_x, map_y))
}
