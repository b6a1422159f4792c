//! Response types and utilities.

pub mod pagination;

pub use pagination::*;
