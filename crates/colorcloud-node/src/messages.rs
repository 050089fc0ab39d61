use colorcloud_3d::pointcloud::PointCloud;
use colorcloud_image::{Image, ImageEncoding, ImageError, ImageSize};

/// Wall clock time in nanoseconds since the unix epoch.
pub fn now_nanos() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Metadata carried by every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Sequence number within the stream.
    pub seq: u32,
    /// Acquisition time in nanoseconds.
    pub stamp: u64,
    /// Coordinate frame of the data.
    pub frame_id: String,
}

impl Header {
    /// A header stamped with the current time.
    pub fn now(seq: u32, frame_id: impl Into<String>) -> Self {
        Self {
            seq,
            stamp: now_nanos(),
            frame_id: frame_id.into(),
        }
    }
}

/// An image as delivered on an image topic.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    /// Message header.
    pub header: Header,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Pixel encoding, e.g. `rgb8`.
    pub encoding: String,
    /// Length of a row in bytes, padding included.
    pub step: u32,
    /// Row-major pixel bytes.
    pub data: Vec<u8>,
}

impl RawImage {
    /// Build a tightly packed `rgb8` message from a three channel image.
    ///
    /// The bytes are copied as they are; nothing checks they really are in
    /// red, green, blue order.
    pub fn from_rgb8(header: Header, image: &Image<u8, 3>) -> Self {
        Self {
            header,
            width: image.width() as u32,
            height: image.height() as u32,
            encoding: ImageEncoding::Rgb8.as_str().to_string(),
            step: (image.width() * 3) as u32,
            data: image.as_slice().to_vec(),
        }
    }

    /// The parsed encoding tag.
    pub fn image_encoding(&self) -> ImageEncoding {
        ImageEncoding::parse(&self.encoding)
    }

    /// Unpack the message into a three channel, 8 bit image.
    ///
    /// Row padding is dropped. Channels are kept in buffer order whatever the
    /// encoding name says about them.
    ///
    /// # Errors
    ///
    /// * [`ImageError::UnsupportedEncoding`] unless the encoding is `rgb8`,
    ///   `bgr8` or `8UC3`.
    /// * [`ImageError::InvalidImageBuffer`] if `step` is shorter than a row
    ///   or the buffer is not `height * step` bytes long.
    pub fn to_image(&self) -> Result<Image<u8, 3>, ImageError> {
        self.image_encoding().require_layout(3, 8)?;

        let (width, height, step) = (
            self.width as usize,
            self.height as usize,
            self.step as usize,
        );
        let row_bytes = width * 3;

        if step < row_bytes || self.data.len() != height * step {
            return Err(ImageError::InvalidImageBuffer(
                self.data.len(),
                height,
                step,
                row_bytes,
            ));
        }

        let size = ImageSize { width, height };
        if step == row_bytes {
            return Image::new(size, self.data.clone());
        }

        let mut data = Vec::with_capacity(row_bytes * height);
        for row in self.data.chunks_exact(step) {
            data.extend_from_slice(&row[..row_bytes]);
        }
        Image::new(size, data)
    }
}

/// A point cloud as delivered on a cloud topic.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudMessage {
    /// Message header.
    pub header: Header,
    /// The points, in sensor order.
    pub cloud: PointCloud,
}
