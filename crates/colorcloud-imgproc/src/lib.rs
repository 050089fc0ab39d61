#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// camera calibration and lens distortion module.
pub mod calibration;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// one-shot undistortion map and image rectification.
pub mod undistort;
