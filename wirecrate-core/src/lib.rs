//! Core data structures and traits for wirecrate
//!
//! This crate provides the fundamental types shared by the wire extraction
//! pipeline: points, point clouds, per-point wire labels, catenary parameters
//! and the fitted wire results handed to exporters.

pub mod point;
pub mod point_cloud;
pub mod label;
pub mod catenary;
pub mod wire;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use label::*;
pub use catenary::*;
pub use wire::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector2, Vector3, Matrix3, DMatrix};
