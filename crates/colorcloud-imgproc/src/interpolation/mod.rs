//! Pixel interpolation methods for image transformations.
//!
//! Samples that fall outside the source image read as zero (constant
//! border), so remapped regions with no source data come out black.
//! Sampling is bilinear between the four adjacent pixels.

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

mod remap;

pub use remap::remap;
