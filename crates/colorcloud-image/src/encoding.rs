use crate::error::ImageError;

/// Pixel encoding tag carried next to a raw image buffer.
///
/// The names follow the sensor image message convention (`rgb8`, `bgr8`,
/// `8UC3`, ...). The tag only describes the memory layout; nothing in this
/// crate reorders channels based on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageEncoding {
    /// 8-bit red, green, blue.
    Rgb8,
    /// 8-bit blue, green, red.
    Bgr8,
    /// 8-bit red, green, blue, alpha.
    Rgba8,
    /// 8-bit blue, green, red, alpha.
    Bgra8,
    /// 8-bit single channel.
    Mono8,
    /// 16-bit single channel.
    Mono16,
    /// Three untagged 8-bit channels.
    Type8UC3,
    /// Three untagged 16-bit channels.
    Type16UC3,
    /// Any encoding string not listed above.
    Unknown(String),
}

impl ImageEncoding {
    /// Parse an encoding string.
    pub fn parse(encoding: &str) -> Self {
        match encoding {
            "rgb8" => Self::Rgb8,
            "bgr8" => Self::Bgr8,
            "rgba8" => Self::Rgba8,
            "bgra8" => Self::Bgra8,
            "mono8" => Self::Mono8,
            "mono16" => Self::Mono16,
            "8UC3" => Self::Type8UC3,
            "16UC3" => Self::Type16UC3,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The encoding string as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rgb8 => "rgb8",
            Self::Bgr8 => "bgr8",
            Self::Rgba8 => "rgba8",
            Self::Bgra8 => "bgra8",
            Self::Mono8 => "mono8",
            Self::Mono16 => "mono16",
            Self::Type8UC3 => "8UC3",
            Self::Type16UC3 => "16UC3",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Number of interleaved channels, `None` for unknown encodings.
    pub fn num_channels(&self) -> Option<usize> {
        match self {
            Self::Mono8 | Self::Mono16 => Some(1),
            Self::Rgb8 | Self::Bgr8 | Self::Type8UC3 | Self::Type16UC3 => Some(3),
            Self::Rgba8 | Self::Bgra8 => Some(4),
            Self::Unknown(_) => None,
        }
    }

    /// Bit depth of a single channel, `None` for unknown encodings.
    pub fn bit_depth(&self) -> Option<usize> {
        match self {
            Self::Mono16 | Self::Type16UC3 => Some(16),
            Self::Unknown(_) => None,
            _ => Some(8),
        }
    }

    /// Check that the encoding holds `channels` channels of `bits` bits.
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedEncoding`] when the layout differs or is unknown.
    pub fn require_layout(&self, channels: usize, bits: usize) -> Result<(), ImageError> {
        match (self.num_channels(), self.bit_depth()) {
            (Some(c), Some(b)) if c == channels && b == bits => Ok(()),
            _ => Err(ImageError::UnsupportedEncoding(
                self.as_str().to_string(),
                channels,
                bits,
            )),
        }
    }
}

impl std::fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
