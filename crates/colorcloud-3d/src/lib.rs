#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// I/O utilities for reading and writing point clouds.
pub mod io;

/// Point cloud container.
pub mod pointcloud;

/// Lidar to image projection and point colourization.
pub mod projection;
