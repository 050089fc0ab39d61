use std::io::{BufRead, Read};
use std::path::Path;

use super::PcdError;
use crate::pointcloud::PointCloud;

const MAX_POINT_STEP: usize = 1024;
const MAX_POINTS: usize = 50_000_000;

// upper bound on the up-front allocation; vectors grow past it as data arrives
const INITIAL_CAPACITY: usize = 1 << 16;

/// Scalar kind of a PCD field, the `TYPE` header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Float,
    Signed,
    Unsigned,
}

impl FieldKind {
    fn parse(token: &str) -> Result<Self, PcdError> {
        match token {
            "F" => Ok(Self::Float),
            "I" => Ok(Self::Signed),
            "U" => Ok(Self::Unsigned),
            _ => Err(PcdError::UnsupportedProperty),
        }
    }
}

#[derive(Debug)]
struct PcdField {
    name: String,
    size: usize,
    kind: FieldKind,
    count: usize,
    offset: usize,
}

#[derive(Debug)]
struct PcdHeader {
    fields: Vec<PcdField>,
    point_step: usize,
    num_points: usize,
}

impl PcdHeader {
    fn field(&self, name: &str) -> Option<&PcdField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Offset of a single 32 bit float field.
    fn float32(&self, name: &str) -> Result<Option<usize>, PcdError> {
        match self.field(name) {
            None => Ok(None),
            Some(f) if f.kind == FieldKind::Float && f.size == 4 && f.count == 1 => {
                Ok(Some(f.offset))
            }
            Some(_) => Err(PcdError::UnsupportedProperty),
        }
    }

    /// Offset of the packed `rgb` field, stored as 4 bytes of any kind.
    fn packed_rgb(&self) -> Result<Option<usize>, PcdError> {
        match self.field("rgb") {
            None => Ok(None),
            Some(f) if f.size == 4 && f.count == 1 => Ok(Some(f.offset)),
            Some(_) => Err(PcdError::UnsupportedProperty),
        }
    }

    fn normal(&self) -> Result<Option<[usize; 3]>, PcdError> {
        for names in [["normal_x", "normal_y", "normal_z"], ["nx", "ny", "nz"]] {
            let [x, y, z] = names;
            if let (Some(x), Some(y), Some(z)) = (self.float32(x)?, self.float32(y)?, self.float32(z)?)
            {
                return Ok(Some([x, y, z]));
            }
        }
        Ok(None)
    }
}

fn parse_tokens<T: std::str::FromStr>(tokens: &[&str]) -> Result<Vec<T>, PcdError> {
    tokens
        .iter()
        .map(|t| t.parse::<T>().map_err(|_| PcdError::UnsupportedProperty))
        .collect()
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader, PcdError> {
    let mut names: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut kinds: Vec<FieldKind> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut num_points = 0usize;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PcdError::MalformedHeader);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((key, values)) = tokens.split_first() else {
            continue;
        };

        match *key {
            "DATA" => {
                if values != ["binary"] {
                    return Err(PcdError::UnsupportedProperty);
                }
                break;
            }
            "FIELDS" => names = values.iter().map(|v| v.to_string()).collect(),
            "SIZE" => sizes = parse_tokens(values)?,
            "TYPE" => {
                kinds = values
                    .iter()
                    .map(|v| FieldKind::parse(v))
                    .collect::<Result<_, _>>()?
            }
            "COUNT" => counts = parse_tokens(values)?,
            "POINTS" => {
                num_points = parse_tokens::<usize>(values)?
                    .first()
                    .copied()
                    .ok_or(PcdError::UnsupportedProperty)?
            }
            // VERSION, WIDTH, HEIGHT, VIEWPOINT and comments
            _ => {}
        }
    }

    if names.is_empty() || sizes.len() != names.len() || kinds.len() != names.len() {
        return Err(PcdError::UnsupportedProperty);
    }

    // a missing COUNT line means one element per field
    if counts.is_empty() {
        counts = vec![1; names.len()];
    } else if counts.len() != names.len() {
        return Err(PcdError::UnsupportedProperty);
    }

    let mut fields: Vec<PcdField> = Vec::with_capacity(names.len());
    let mut offset = 0usize;
    for (((name, size), kind), count) in names.into_iter().zip(sizes).zip(kinds).zip(counts) {
        if fields.iter().any(|f| f.name == name) {
            return Err(PcdError::MalformedHeader);
        }

        let bytes = size.checked_mul(count).ok_or(PcdError::MalformedHeader)?;
        fields.push(PcdField {
            name,
            size,
            kind,
            count,
            offset,
        });

        offset = offset
            .checked_add(bytes)
            .filter(|step| *step <= MAX_POINT_STEP)
            .ok_or(PcdError::MalformedHeader)?;
    }

    if offset == 0 || num_points > MAX_POINTS {
        return Err(PcdError::MalformedHeader);
    }

    Ok(PcdHeader {
        fields,
        point_step: offset,
        num_points,
    })
}

#[inline]
fn le_bytes(record: &[u8], offset: usize) -> [u8; 4] {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&record[offset..offset + 4]);
    bytes
}

/// Read a binary PCD file.
///
/// # Arguments
/// * `path` - Path to a `.pcd` file.
///
/// # Returns
/// A [`PointCloud`] with the positions, plus colours when an `rgb` field is
/// present and normals when all three normal fields are.
///
/// Extra fields such as lidar `intensity` or `ring` are skipped.
pub fn read_pcd_binary(path: impl AsRef<Path>) -> Result<PointCloud, PcdError> {
    let path = path.as_ref();
    match path.extension() {
        Some(ext) if ext == "pcd" => {}
        ext => {
            return Err(PcdError::InvalidFileExtension(
                ext.map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ))
        }
    }

    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);

    read_pcd_binary_from_reader(&mut reader)
}

/// Read a binary PCD stream from any buffered reader.
pub fn read_pcd_binary_from_reader<R: BufRead>(reader: &mut R) -> Result<PointCloud, PcdError> {
    let header = parse_header(reader)?;

    let xyz = [
        header.float32("x")?,
        header.float32("y")?,
        header.float32("z")?,
    ];
    let [Some(fx), Some(fy), Some(fz)] = xyz else {
        return Err(PcdError::UnsupportedProperty);
    };
    let rgb = header.packed_rgb()?;
    let normal = header.normal()?;

    let mut record = vec![0u8; header.point_step];
    let capacity = header.num_points.min(INITIAL_CAPACITY);
    let mut points = Vec::with_capacity(capacity);
    let mut colors = rgb.map(|_| Vec::with_capacity(capacity));
    let mut normals = normal.map(|_| Vec::with_capacity(capacity));

    let float = |record: &[u8], offset: usize| f32::from_le_bytes(le_bytes(record, offset)) as f64;

    for _ in 0..header.num_points {
        reader.read_exact(&mut record)?;

        points.push([float(&record, fx), float(&record, fy), float(&record, fz)]);

        if let (Some(colors), Some(offset)) = (colors.as_mut(), rgb) {
            // 0x00RRGGBB, whatever the declared type
            let [b, g, r, _] = le_bytes(&record, offset);
            colors.push([r, g, b]);
        }

        if let (Some(normals), Some([nx, ny, nz])) = (normals.as_mut(), normal) {
            normals.push([float(&record, nx), float(&record, ny), float(&record, nz)]);
        }
    }

    Ok(PointCloud::new(points, colors, normals)?)
}
