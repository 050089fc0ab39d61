#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Startup configuration.
pub mod config;

/// Error types for the node.
pub mod error;

/// Directory backed sources and sinks.
pub mod file_io;

/// Message types exchanged on the node topics.
pub mod messages;

/// The dispatch loop and the publisher seam.
pub mod node;

/// Calibration state shared by the image and cloud handlers.
pub mod state;

pub use crate::config::FusionConfig;
pub use crate::error::NodeError;
pub use crate::node::{FusionNode, Publisher};
pub use crate::state::FusionState;
