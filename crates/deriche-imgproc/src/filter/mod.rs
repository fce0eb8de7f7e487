//! Filter operations
//!
//! This module provides the recursive (IIR) Gaussian filters. The building
//! blocks, from the bottom up:
//!
//! - [`coefficients`]: derivation of the Deriche recursion coefficients.
//! - [`recursive`]: the causal and anticausal recursion over a single line.
//! - [`axis`]: application of the line recursion along one axis of an image.
//! - [`RecursiveGaussianFilter`]: a configured filter with cached coefficients.
//! - [`gaussian_smooth_recursive`] and [`gaussian_derivative_recursive`]:
//!   chained axis passes.

/// Recursion coefficients
pub mod coefficients;

/// Filter errors
mod error;
pub use error::*;

/// Line recursion
pub mod recursive;

/// Axis application
pub mod axis;

/// Configured recursive gaussian filter
mod recursive_gaussian;
pub use recursive_gaussian::*;

/// Separable multi-axis operations
mod separable;
pub use separable::*;

pub use coefficients::{DericheCoefficients, ExponentialSeries, KernelOrder};
