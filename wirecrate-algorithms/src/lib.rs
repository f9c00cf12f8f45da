//! # Wirecrate Algorithms
//!
//! Algorithms for extracting power-line wires from LiDAR point clouds.
//!
//! This crate provides principal-axis projection, density-based wire
//! separation, catenary fitting and the pipeline that chains them.

pub mod projection;
pub mod separation;
pub mod catenary;
pub mod fitting;
pub mod pipeline;

// Re-export commonly used items
pub use projection::*;
pub use separation::*;
pub use catenary::*;
pub use fitting::*;
pub use pipeline::*;
