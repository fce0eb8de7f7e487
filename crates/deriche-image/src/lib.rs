#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// N-dimensional image representation.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{get_strides_from_shape, NdImage};
