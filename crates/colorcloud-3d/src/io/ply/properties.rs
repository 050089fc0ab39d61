use super::PlyError;

/// A single vertex property declared in a PLY header.
#[derive(Debug, PartialEq, Clone)]
pub struct PlyPropertyDefinition {
    /// The property name, e.g. `x` or `red`.
    pub name: String,
    /// The scalar type of the property.
    pub data_type: PlyDataType,
}

/// The scalar types of the PLY format.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PlyDataType {
    /// 32 bit float
    Float32,
    /// 64 bit float
    Float64,
    /// 8 bit signed integer
    Int8,
    /// 8 bit unsigned integer
    UInt8,
    /// 16 bit signed integer
    Int16,
    /// 16 bit unsigned integer
    UInt16,
    /// 32 bit signed integer
    Int32,
    /// 32 bit unsigned integer
    UInt32,
}

impl PlyDataType {
    /// The size of the type in bytes.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Float32 | PlyDataType::Int32 | PlyDataType::UInt32 => 4,
            PlyDataType::Float64 => 8,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
        }
    }

    /// Parse a PLY type name, accepting both the short and the sized spelling.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            _ => Err(PlyError::UnsupportedProperty),
        }
    }

    /// Decode a little-endian value of this type as `f64`.
    ///
    /// `buf` must hold at least [`PlyDataType::size`] bytes.
    pub fn read_le(&self, buf: &[u8]) -> Result<f64, PlyError> {
        let bytes = buf
            .get(..self.size())
            .ok_or(PlyError::UnsupportedProperty)?;
        let value = match self {
            PlyDataType::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PlyDataType::Float64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
            PlyDataType::Int8 => bytes[0] as i8 as f64,
            PlyDataType::UInt8 => bytes[0] as f64,
            PlyDataType::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PlyDataType::UInt16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PlyDataType::Int32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PlyDataType::UInt32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        };
        Ok(value)
    }
}

/// Byte layout of one vertex record.
#[derive(Debug, Clone)]
pub struct PlyVertexLayout {
    properties: Vec<(PlyPropertyDefinition, usize)>,
    vertex_size: usize,
}

impl PlyVertexLayout {
    /// Compute the offsets of the properties, in declaration order.
    pub fn new(properties: Vec<PlyPropertyDefinition>) -> Self {
        let mut offset = 0;
        let properties = properties
            .into_iter()
            .map(|p| {
                let this = offset;
                offset += p.data_type.size();
                (p, this)
            })
            .collect();
        Self {
            properties,
            vertex_size: offset,
        }
    }

    /// The size of a vertex record in bytes.
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    /// The number of declared properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no property is declared.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The type and byte offset of the property `name`.
    pub fn find(&self, name: &str) -> Option<(PlyDataType, usize)> {
        self.properties
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(p, offset)| (p.data_type, *offset))
    }

    /// The type and offset of every name in `names`, or `None` if one is missing.
    pub fn find_all<const N: usize>(&self, names: [&str; N]) -> Option<[(PlyDataType, usize); N]> {
        let mut found = [(PlyDataType::UInt8, 0); N];
        for (slot, name) in found.iter_mut().zip(names) {
            *slot = self.find(name)?;
        }
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, data_type: PlyDataType) -> PlyPropertyDefinition {
        PlyPropertyDefinition {
            name: name.to_string(),
            data_type,
        }
    }

    #[test]
    fn test_layout_offsets() {
        let layout = PlyVertexLayout::new(vec![
            prop("x", PlyDataType::Float32),
            prop("y", PlyDataType::Float32),
            prop("z", PlyDataType::Float32),
            prop("red", PlyDataType::UInt8),
            prop("intensity", PlyDataType::Float64),
        ]);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.vertex_size(), 21);
        assert_eq!(layout.find("red"), Some((PlyDataType::UInt8, 12)));
        assert_eq!(layout.find("intensity"), Some((PlyDataType::Float64, 13)));
        assert!(layout.find_all(["nx", "ny", "nz"]).is_none());
    }

    #[test]
    fn test_read_le() -> Result<(), PlyError> {
        assert_eq!(PlyDataType::Float32.read_le(&1.5f32.to_le_bytes())?, 1.5);
        assert_eq!(PlyDataType::Int16.read_le(&(-3i16).to_le_bytes())?, -3.0);
        assert_eq!(PlyDataType::UInt8.read_le(&[200])?, 200.0);
        assert!(PlyDataType::Float64.read_le(&[0; 4]).is_err());
        Ok(())
    }
}
