use std::io::Write;
use std::path::Path;

use super::PlyError;
use crate::pointcloud::PointCloud;

/// Write a point cloud as a binary little-endian PLY stream.
///
/// Every vertex stores `x y z` as floats, followed by `red green blue` as
/// bytes when the cloud is coloured and `nx ny nz` when it has normals.
pub fn write_ply_binary_to_writer<W: Write>(
    writer: &mut W,
    pointcloud: &PointCloud,
) -> Result<(), PlyError> {
    let colors = pointcloud.colors();
    let normals = pointcloud.normals();

    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "element vertex {}", pointcloud.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property float {axis}")?;
    }
    if colors.is_some() {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property uchar {channel}")?;
        }
    }
    if normals.is_some() {
        for axis in ["nx", "ny", "nz"] {
            writeln!(writer, "property float {axis}")?;
        }
    }
    writeln!(writer, "end_header")?;

    for (i, point) in pointcloud.points().iter().enumerate() {
        for v in point {
            writer.write_all(&(*v as f32).to_le_bytes())?;
        }
        if let Some(colors) = colors {
            writer.write_all(&colors[i])?;
        }
        if let Some(normals) = normals {
            for v in &normals[i] {
                writer.write_all(&(*v as f32).to_le_bytes())?;
            }
        }
    }

    Ok(())
}

/// Write a point cloud to a binary PLY file.
pub fn write_ply_binary(path: impl AsRef<Path>, pointcloud: &PointCloud) -> Result<(), PlyError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_ply_binary_to_writer(&mut writer, pointcloud)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ply::read_ply_binary;

    #[test]
    fn test_write_header_coloured() -> Result<(), PlyError> {
        let cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]], Some(vec![[9, 8, 7]]), None)?;
        let mut out = Vec::new();
        write_ply_binary_to_writer(&mut out, &cloud)?;

        let header_end = b"end_header\n";
        let pos = out
            .windows(header_end.len())
            .position(|w| w == header_end)
            .expect("header terminator");
        let body = &out[pos + header_end.len()..];
        assert_eq!(body.len(), 3 * 4 + 3);
        assert_eq!(&body[12..], &[9, 8, 7]);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> Result<(), PlyError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("000000.ply");
        let cloud = PointCloud::new(
            vec![[0.25, -1.0, 4.0], [2.0, 0.0, 0.5]],
            Some(vec![[0, 0, 0], [10, 20, 30]]),
            None,
        )?;
        write_ply_binary(&path, &cloud)?;
        assert_eq!(read_ply_binary(&path)?, cloud);
        Ok(())
    }
}
