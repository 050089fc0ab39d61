use std::io::{BufRead, Read};
use std::path::Path;

use super::{PlyDataType, PlyError, PlyPropertyDefinition, PlyVertexLayout};
use crate::pointcloud::PointCloud;

const MAX_VERTICES: usize = 50_000_000;

// upper bound on the up-front allocation; vectors grow past it as data arrives
const INITIAL_CAPACITY: usize = 1 << 16;

struct PlyHeader {
    pub vertex_count: usize,
    pub layout: PlyVertexLayout,
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut vertex_count = None;
    let mut is_binary_little_endian = false;
    let mut is_ply = false;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::UnsupportedProperty);
        }
        let trimmed = line.trim();

        if trimmed == "ply" {
            is_ply = true;
            continue;
        }

        if trimmed == "end_header" {
            break;
        }

        if trimmed.starts_with("format binary_little_endian") {
            is_binary_little_endian = true;
        } else if let Some(element) = trimmed.strip_prefix("element") {
            let mut parts = element.split_whitespace();
            in_vertex_element = parts.next() == Some("vertex");
            if in_vertex_element {
                vertex_count = parts.next().and_then(|s| s.parse().ok());
            } else if vertex_count.is_none() {
                // elements before the vertices would shift the vertex data
                return Err(PlyError::UnsupportedProperty);
            }
        } else if trimmed.starts_with("property") && in_vertex_element {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != 3 {
                // list properties have no fixed size
                return Err(PlyError::UnsupportedProperty);
            }
            let data_type = PlyDataType::parse(parts[1])?;
            let name = parts[2].to_string();
            properties.push(PlyPropertyDefinition { name, data_type });
        }
    }

    if !is_ply || !is_binary_little_endian {
        return Err(PlyError::UnsupportedProperty);
    }

    let vertex_count = vertex_count.ok_or(PlyError::UnsupportedProperty)?;
    if vertex_count > MAX_VERTICES {
        return Err(PlyError::TooManyVertices(vertex_count, MAX_VERTICES));
    }

    Ok(PlyHeader {
        vertex_count,
        layout: PlyVertexLayout::new(properties),
    })
}

fn read_triplet(
    buffer: &[u8],
    fields: &[(PlyDataType, usize); 3],
) -> Result<[f64; 3], PlyError> {
    let mut out = [0.0; 3];
    for (v, (data_type, offset)) in out.iter_mut().zip(fields) {
        *v = data_type.read_le(&buffer[*offset..])?;
    }
    Ok(out)
}

/// Read a binary little-endian PLY stream from any buffered reader.
///
/// The vertices must declare `x y z`; `red green blue` and `nx ny nz` are
/// read when present. Every other scalar property is skipped.
pub fn read_ply_binary_from_reader<R: BufRead>(reader: &mut R) -> Result<PointCloud, PlyError> {
    let header = parse_header(reader)?;
    let layout = &header.layout;

    let xyz = layout
        .find_all(["x", "y", "z"])
        .ok_or(PlyError::MissingProperty("x y z"))?;
    let rgb = layout.find_all(["red", "green", "blue"]);
    let normal = layout
        .find_all(["nx", "ny", "nz"])
        .or_else(|| layout.find_all(["normal_x", "normal_y", "normal_z"]));

    let mut buffer = vec![0u8; layout.vertex_size()];

    let capacity = header.vertex_count.min(INITIAL_CAPACITY);
    let mut points = Vec::with_capacity(capacity);
    let mut colors = Vec::with_capacity(rgb.map_or(0, |_| capacity));
    let mut normals = Vec::with_capacity(normal.map_or(0, |_| capacity));

    for _ in 0..header.vertex_count {
        reader.read_exact(&mut buffer)?;
        points.push(read_triplet(&buffer, &xyz)?);

        if let Some(rgb) = &rgb {
            let [r, g, b] = read_triplet(&buffer, rgb)?;
            colors.push([r as u8, g as u8, b as u8]);
        }

        if let Some(normal) = &normal {
            normals.push(read_triplet(&buffer, normal)?);
        }
    }

    Ok(PointCloud::new(
        points,
        rgb.map(|_| colors),
        normal.map(|_| normals),
    )?)
}

/// Read a PLY file in binary little-endian format.
pub fn read_ply_binary(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    read_ply_binary_from_reader(&mut reader)
}
