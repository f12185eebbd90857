//! One-way import of graphs and templates from a serde-friendly format.

pub mod conversion;
pub mod model;

pub use conversion::*;
pub use model::*;
