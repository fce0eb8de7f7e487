#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image filtering module.
pub mod filter;

/// floating point abstraction used by the filters.
pub mod float;

/// module containing parallization utilities.
pub mod parallel;
