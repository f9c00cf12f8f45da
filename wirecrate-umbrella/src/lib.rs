//! # Wirecrate
//!
//! Power-line wire extraction from LiDAR point clouds.
//!
//! This is the umbrella crate that provides convenient access to all wirecrate
//! functionality. Use the individual crates for more granular control over
//! dependencies.
//!
//! ## Features
//!
//! - **Core**: Points, point clouds, wire labels, catenary parameters and fit reports
//! - **Algorithms**: Principal-axis projection, wire separation, catenary fitting
//! - **I/O**: CSV/XYZ point tables, CSV and OBJ result export
//!
//! ## Quick Start
//!
//! ```rust
//! use wirecrate::prelude::*;
//!
//! let sag = CatenaryParams { x0: 0.0, y0: 10.0, c: 40.0 };
//! let mut cloud = PointCloud::new();
//! for wire in 0..2 {
//!     for x in linspace(-15.0, 15.0, 80) {
//!         cloud.push(Point3d::new(x, wire as f64 * 3.0, sag.evaluate(x)));
//!     }
//! }
//!
//! let config = PipelineConfig::default()
//!     .with_separation(SeparationParams::default().with_eps(0.5));
//! let extraction = extract_wires(&cloud, &config).unwrap();
//! assert_eq!(extraction.wire_count(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms and io
//! - `algorithms`: Separation and fitting algorithms
//! - `io`: File format support
//! - `all`: Enables all features

// Re-export core functionality
pub use wirecrate_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use wirecrate_algorithms as algorithms;

#[cfg(feature = "io")]
pub use wirecrate_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use wirecrate_core::{
        group_by_wire, linspace, noise_count, Bounded, CatenaryParams, Error, FittedWire, Point2d,
        Point3d, PointCloud, Result, SkippedWire, Vector3d, WireFitReport, WireId, WireLabel,
    };

    #[cfg(feature = "algorithms")]
    pub use wirecrate_algorithms::{
        extract_wires, fit_all, fit_catenary, project, separate, AxisChoice, CatenaryFitOptions,
        CurveFitParams, PipelineConfig, SeparationParams, WireExtraction,
    };

    #[cfg(feature = "io")]
    pub use wirecrate_io::{export_report, read_point_cloud, read_point_table, PointTable};
}
