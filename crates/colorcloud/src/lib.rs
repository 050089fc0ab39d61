#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use colorcloud_image as image;

#[doc(inline)]
pub use colorcloud_imgproc as imgproc;

#[doc(inline)]
pub use colorcloud_3d as k3d;

#[doc(inline)]
pub use colorcloud_node as node;
