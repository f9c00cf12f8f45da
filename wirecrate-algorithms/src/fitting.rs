//! Per-wire curve fitting
//!
//! Each labelled group is projected onto its own best-fit plane, a catenary
//! is fitted in that plane and the sampled curve is mapped back to 3D.
//! Groups are independent and a failed group is skipped, never fatal.

use crate::catenary::{fit_catenary, CatenaryFitOptions};
use crate::projection::project;
use itertools::Itertools;
use log::{debug, info, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;
use wirecrate_core::{
    group_by_wire, Error, FittedWire, Point3d, PointCloud, Result, WireFitReport, WireId, WireLabel,
};

/// Settings for `fit_all`
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFitParams {
    /// Number of curve samples per wire
    pub samples: usize,
    /// Catenary solver settings
    pub fit: CatenaryFitOptions,
    /// Fit groups on the rayon thread pool
    pub parallel: bool,
}

impl Default for CurveFitParams {
    fn default() -> Self {
        Self {
            samples: 300,
            fit: CatenaryFitOptions::default(),
            parallel: true,
        }
    }
}

impl CurveFitParams {
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_fit_options(mut self, fit: CatenaryFitOptions) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples < 2 {
            return Err(Error::InvalidParameter(format!(
                "at least 2 curve samples are required, got {}",
                self.samples
            )));
        }
        self.fit.validate()
    }
}

/// Fit a catenary to every labelled wire group
///
/// Noise points are ignored. Groups that cannot be fitted are recorded in
/// `WireFitReport::skipped` and logged; the remaining groups are still
/// returned. Parallel and sequential runs produce identical reports.
///
/// # Arguments
/// * `cloud` - Input points
/// * `labels` - One label per point, as produced by `separate`
/// * `params` - Sample count, solver options and parallelism
///
/// # Returns
/// * `Result<WireFitReport>` - Fitted and skipped wires keyed by id
pub fn fit_all(
    cloud: &PointCloud<Point3d>,
    labels: &[WireLabel],
    params: &CurveFitParams,
) -> Result<WireFitReport> {
    if labels.len() != cloud.len() {
        return Err(Error::InvalidLabels {
            expected: cloud.len(),
            found: labels.len(),
        });
    }
    params.validate()?;

    let groups: Vec<(WireId, Vec<usize>)> = group_by_wire(labels).into_iter().collect();
    debug!("Fitting {} wire groups (parallel: {})", groups.len(), params.parallel);

    let outcomes: Vec<(WireId, Result<FittedWire>)> = if params.parallel {
        groups
            .par_iter()
            .map(|(id, indices)| (*id, fit_wire(cloud, *id, indices, params)))
            .collect()
    } else {
        groups
            .iter()
            .map(|(id, indices)| (*id, fit_wire(cloud, *id, indices, params)))
            .collect()
    };

    let mut report = WireFitReport::new();
    for (id, outcome) in outcomes {
        if let Err(err) = &outcome {
            warn!("Skipping wire {}: {}", id, err);
        }
        report.record(id, outcome);
    }

    info!(
        "Fitted {} of {} wires ({} skipped)",
        report.len(),
        groups.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Fit a single wire made of the points at `indices`
pub fn fit_wire(
    cloud: &PointCloud<Point3d>,
    id: WireId,
    indices: &[usize],
    params: &CurveFitParams,
) -> Result<FittedWire> {
    params.validate()?;
    let points = cloud.subset(indices);
    let projection = project(points.as_slice(), 2)?;
    let x = projection.axis_values(0);
    let z = projection.axis_values(1);

    let fit = fit_catenary(&x, &z, &params.fit)?;

    let (x_min, x_max) = x
        .iter()
        .copied()
        .minmax_by(|a, b| a.total_cmp(b))
        .into_option()
        .ok_or_else(|| Error::DegenerateInput(format!("wire {id} has no points")))?;

    let profile = fit.params.sample(x_min, x_max, params.samples);
    if !profile.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return Err(Error::FitNonConvergence {
            iterations: fit.iterations,
            reason: "fitted curve is not finite over the wire extent".to_string(),
        });
    }

    let plane = DMatrix::from_fn(profile.len(), 2, |row, col| {
        if col == 0 {
            profile[row].x
        } else {
            profile[row].y
        }
    });
    let curve = projection.basis.inverse_project(&plane)?;

    debug!(
        "Wire {}: {} points, c = {:.4}, rmse = {:.3e}",
        id,
        points.len(),
        fit.params.c,
        fit.rmse
    );

    Ok(FittedWire {
        id,
        params: fit.params,
        curve,
        profile,
        points,
        rmse: fit.rmse,
        iterations: fit.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirecrate_core::CatenaryParams;

    /// Points of a catenary hanging in the plane y = `offset`
    fn hanging_wire(offset: f64, truth: &CatenaryParams, count: usize) -> Vec<Point3d> {
        wirecrate_core::linspace(-10.0, 10.0, count)
            .into_iter()
            .map(|x| Point3d::new(x, offset, truth.evaluate(x)))
            .collect()
    }

    fn two_wire_cloud() -> (PointCloud<Point3d>, Vec<WireLabel>, CatenaryParams) {
        let truth = CatenaryParams { x0: 0.0, y0: 5.0, c: 20.0 };
        let mut points = hanging_wire(0.0, &truth, 60);
        points.extend(hanging_wire(2.0, &truth, 60));
        let mut labels = vec![WireLabel::Wire(0); 60];
        labels.extend(vec![WireLabel::Wire(1); 60]);
        (PointCloud::from_points(points), labels, truth)
    }

    #[test]
    fn test_fit_all_reconstructs_curves() {
        let (cloud, labels, truth) = two_wire_cloud();
        let report = fit_all(&cloud, &labels, &CurveFitParams::default()).unwrap();

        assert_eq!(report.len(), 2);
        assert!(report.skipped.is_empty());
        for (offset, wire) in [(0.0, report.get(0).unwrap()), (2.0, report.get(1).unwrap())] {
            assert_eq!(wire.sample_count(), 300);
            assert_eq!(wire.points.len(), 60);
            assert!(wire.profile.windows(2).all(|w| w[0].x <= w[1].x));
            for p in &wire.curve {
                assert!((p.y - offset).abs() < 1e-6);
                assert!((p.z - truth.evaluate(p.x)).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_noise_points_are_excluded() {
        let (mut cloud, mut labels, _) = two_wire_cloud();
        let stray = Point3d::new(100.0, 100.0, 100.0);
        cloud.push(stray);
        labels.push(WireLabel::Noise);

        let report = fit_all(&cloud, &labels, &CurveFitParams::default()).unwrap();
        assert_eq!(report.len(), 2);
        for wire in report.wires.values() {
            assert!(wire.points.iter().all(|p| *p != stray));
        }
    }

    #[test]
    fn test_degenerate_groups_are_skipped() {
        let (mut cloud, mut labels, _) = two_wire_cloud();
        // Straight segment, no plane to fit in
        for i in 0..10 {
            cloud.push(Point3d::new(i as f64, 50.0, 1.0));
            labels.push(WireLabel::Wire(2));
        }
        // Two points only
        cloud.push(Point3d::new(0.0, 80.0, 0.0));
        cloud.push(Point3d::new(1.0, 80.0, 0.5));
        labels.push(WireLabel::Wire(3));
        labels.push(WireLabel::Wire(3));

        let report = fit_all(&cloud, &labels, &CurveFitParams::default()).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.skipped_ids(), vec![2, 3]);
        assert!(report.skipped.iter().all(|s| s.error.is_per_wire()));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (cloud, labels, _) = two_wire_cloud();
        let parallel = fit_all(&cloud, &labels, &CurveFitParams::default()).unwrap();
        let sequential =
            fit_all(&cloud, &labels, &CurveFitParams::default().with_parallel(false)).unwrap();

        assert_eq!(parallel.wires, sequential.wires);
    }

    #[test]
    fn test_label_length_mismatch() {
        let (cloud, mut labels, _) = two_wire_cloud();
        labels.pop();
        let result = fit_all(&cloud, &labels, &CurveFitParams::default());
        assert!(matches!(
            result,
            Err(Error::InvalidLabels { expected: 120, found: 119 })
        ));
    }

    #[test]
    fn test_custom_sample_count_and_validation() {
        let (cloud, labels, _) = two_wire_cloud();
        let report = fit_all(&cloud, &labels, &CurveFitParams::default().with_samples(25)).unwrap();
        assert!(report.wires.values().all(|w| w.sample_count() == 25));

        let result = fit_all(&cloud, &labels, &CurveFitParams::default().with_samples(1));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_fit_wire_rejects_invalid_params() {
        let (cloud, _, _) = two_wire_cloud();
        let indices: Vec<usize> = (0..60).collect();

        let result = fit_wire(&cloud, 0, &indices, &CurveFitParams::default().with_samples(0));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let wire = fit_wire(&cloud, 0, &indices, &CurveFitParams::default().with_samples(2)).unwrap();
        assert_eq!(wire.sample_count(), 2);
    }

    #[test]
    fn test_all_noise_gives_empty_report() {
        let (cloud, _, _) = two_wire_cloud();
        let labels = vec![WireLabel::Noise; cloud.len()];
        let report = fit_all(&cloud, &labels, &CurveFitParams::default()).unwrap();
        assert!(report.is_empty());
        assert!(report.skipped.is_empty());
    }
}
