/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images (or an image and a map) are expected to share a size.
    #[error("Invalid image size ({0}, {1}) mismatch ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the encoding does not describe the expected pixel layout.
    #[error("Unsupported image encoding '{0}', expected {1} channels of {2} bit(s)")]
    UnsupportedEncoding(String, usize, usize),

    /// Error when a raw buffer does not hold `height` rows of `step` bytes.
    #[error("Invalid image buffer: {0} bytes for {1} rows with step {2} (min step {3})")]
    InvalidImageBuffer(usize, usize, usize, usize),
}
