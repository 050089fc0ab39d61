/// PCD reader and writer module.
pub mod pcd;

/// PLY reader and writer module.
pub mod ply;
