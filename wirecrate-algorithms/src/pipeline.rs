//! End-to-end wire extraction: separate the cloud into wires, then fit each one

use crate::fitting::{fit_all, CurveFitParams};
use crate::separation::{separate, SeparationParams};
use log::info;
use wirecrate_core::{group_by_wire, noise_count, Point3d, PointCloud, Result, WireFitReport, WireLabel};

/// Configuration for the full extraction pipeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub separation: SeparationParams,
    pub fitting: CurveFitParams,
}

impl PipelineConfig {
    pub fn with_separation(mut self, separation: SeparationParams) -> Self {
        self.separation = separation;
        self
    }

    pub fn with_fitting(mut self, fitting: CurveFitParams) -> Self {
        self.fitting = fitting;
        self
    }

    /// Check both stages' parameters before any work is done
    pub fn validate(&self) -> Result<()> {
        self.separation.validate()?;
        self.fitting.validate()
    }
}

/// Labels and fitted curves for one point cloud
#[derive(Debug)]
pub struct WireExtraction {
    /// One label per input point
    pub labels: Vec<WireLabel>,
    pub report: WireFitReport,
}

impl WireExtraction {
    /// Number of successfully fitted wires
    pub fn wire_count(&self) -> usize {
        self.report.len()
    }

    /// Number of clusters found by the separator, fitted or not
    pub fn cluster_count(&self) -> usize {
        group_by_wire(&self.labels).len()
    }

    /// Number of points labelled as noise
    pub fn noise_count(&self) -> usize {
        noise_count(&self.labels)
    }
}

/// Run separation followed by per-wire fitting
///
/// # Example
/// ```rust
/// use wirecrate_core::{Point3d, PointCloud};
/// use wirecrate_algorithms::pipeline::{extract_wires, PipelineConfig};
///
/// let cloud: PointCloud<Point3d> = PointCloud::new();
/// let extraction = extract_wires(&cloud, &PipelineConfig::default()).unwrap();
/// assert_eq!(extraction.wire_count(), 0);
/// ```
pub fn extract_wires(cloud: &PointCloud<Point3d>, config: &PipelineConfig) -> Result<WireExtraction> {
    config.validate()?;

    let labels = separate(cloud, &config.separation)?;
    let report = fit_all(cloud, &labels, &config.fitting)?;

    let extraction = WireExtraction { labels, report };
    info!(
        "Extracted {} wires from {} points ({} clusters, {} noise points)",
        extraction.wire_count(),
        cloud.len(),
        extraction.cluster_count(),
        extraction.noise_count()
    );
    Ok(extraction)
}
