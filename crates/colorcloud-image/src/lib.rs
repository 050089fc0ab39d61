#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for computer vision purposes.
pub mod image;

/// pixel encodings as carried by sensor image messages.
pub mod encoding;

/// Error types for the image module.
pub mod error;

pub use crate::encoding::ImageEncoding;
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
