use std::io::Write;
use std::path::Path;

use super::PcdError;
use crate::pointcloud::PointCloud;

/// Write a point cloud as a binary PCD stream.
///
/// Positions are stored as `x y z` floats. Colours, when present, are packed
/// into a single `rgb` field as `0x00RRGGBB`.
pub fn write_pcd_binary_to_writer<W: Write>(
    writer: &mut W,
    pointcloud: &PointCloud,
) -> Result<(), PcdError> {
    let colors = pointcloud.colors();
    let (fields, sizes, types, counts) = if colors.is_some() {
        ("x y z rgb", "4 4 4 4", "F F F U", "1 1 1 1")
    } else {
        ("x y z", "4 4 4", "F F F", "1 1 1")
    };

    let num_points = pointcloud.len();
    write!(
        writer,
        "# .PCD v0.7 - Point Cloud Data file format\n\
         VERSION 0.7\n\
         FIELDS {fields}\n\
         SIZE {sizes}\n\
         TYPE {types}\n\
         COUNT {counts}\n\
         WIDTH {num_points}\n\
         HEIGHT 1\n\
         VIEWPOINT 0 0 0 1 0 0 0\n\
         POINTS {num_points}\n\
         DATA binary\n"
    )?;

    for (i, point) in pointcloud.points().iter().enumerate() {
        for v in point {
            writer.write_all(&(*v as f32).to_le_bytes())?;
        }
        if let Some(colors) = colors {
            let [r, g, b] = colors[i];
            let rgb = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
            writer.write_all(&rgb.to_le_bytes())?;
        }
    }

    Ok(())
}

/// Write a point cloud to a binary `.pcd` file.
pub fn write_pcd_binary(path: impl AsRef<Path>, pointcloud: &PointCloud) -> Result<(), PcdError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_pcd_binary_to_writer(&mut writer, pointcloud)?;
    writer.flush()?;
    Ok(())
}
