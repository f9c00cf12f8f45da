//! Wire separation
//!
//! Projects the whole cloud onto its three principal axes and runs a
//! one-dimensional DBSCAN along one of them. Wires that overlap in the raw
//! coordinates are usually well separated along a single principal axis,
//! which is not always the dominant one, so the axis is chosen by the caller.

use crate::projection::{project_with_policy, Projection, RankPolicy};
use log::{debug, info};
use wirecrate_core::{noise_count, Error, Point3d, PointCloud, Result, WireId, WireLabel};

/// Which principal axis to cluster on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisChoice {
    /// Principal axis index 0, 1 or 2
    Fixed(usize),
    /// Pick the axis with `select_axis`
    Auto,
}

impl Default for AxisChoice {
    fn default() -> Self {
        AxisChoice::Fixed(1)
    }
}

/// Parameters for wire separation
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationParams {
    /// Neighbourhood radius along the clustering axis
    pub eps: f64,
    /// Minimum neighbourhood size (self included) for a core point
    pub min_samples: usize,
    /// Principal axis to cluster on
    pub axis: AxisChoice,
}

impl Default for SeparationParams {
    fn default() -> Self {
        Self {
            eps: 0.1,
            min_samples: 5,
            axis: AxisChoice::default(),
        }
    }
}

impl SeparationParams {
    /// Create parameters clustering on a fixed principal axis
    pub fn new(eps: f64, min_samples: usize, axis: usize) -> Self {
        Self {
            eps,
            min_samples,
            axis: AxisChoice::Fixed(axis),
        }
    }

    /// Set the clustering axis
    pub fn with_axis(mut self, axis: AxisChoice) -> Self {
        self.axis = axis;
        self
    }

    /// Set the neighbourhood radius
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Set the core point threshold
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Check the parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "eps must be positive and finite, got {}",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(Error::InvalidParameter(
                "min_samples must be at least 1".to_string(),
            ));
        }
        if let AxisChoice::Fixed(axis) = self.axis {
            if axis > 2 {
                return Err(Error::InvalidParameter(format!(
                    "axis index must be 0, 1 or 2, got {axis}"
                )));
            }
        }
        Ok(())
    }
}

/// Clustering quality of one principal axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScore {
    pub axis: usize,
    pub clusters: usize,
    pub noise: usize,
    /// Clustered points per cluster, 0 when there is no cluster
    pub mean_cluster_size: f64,
}

/// Label every point with a wire id or noise
///
/// Labels are index-aligned with `cloud`. Wire ids are numbered from 0 in the
/// order their first core point appears in the input, so identical input
/// always yields identical labels.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `params` - Neighbourhood radius, core threshold and clustering axis
///
/// # Returns
/// * `Result<Vec<WireLabel>>` - One label per input point
///
/// # Example
/// ```rust
/// use wirecrate_core::{Point3d, PointCloud, WireLabel};
/// use wirecrate_algorithms::separation::{separate, SeparationParams};
///
/// let mut cloud = PointCloud::new();
/// for x in 0..10 {
///     cloud.push(Point3d::new(x as f64, 0.0, 0.0));
///     cloud.push(Point3d::new(x as f64, 1.0, 0.0));
/// }
/// let labels = separate(&cloud, &SeparationParams::new(0.5, 2, 1)).unwrap();
/// assert!(labels.iter().all(|l| *l != WireLabel::Noise));
/// ```
pub fn separate(cloud: &PointCloud<Point3d>, params: &SeparationParams) -> Result<Vec<WireLabel>> {
    params.validate()?;

    if cloud.is_empty() {
        return Ok(Vec::new());
    }

    let projection = project_with_policy(cloud.as_slice(), 3, RankPolicy::AllowDeficient)?;

    let axis = match params.axis {
        AxisChoice::Fixed(axis) => axis,
        AxisChoice::Auto => {
            let scores = score_axes(&projection, params.eps, params.min_samples);
            let axis = best_axis(&scores);
            info!("Automatic axis selection picked axis {axis}: {:?}", scores[axis]);
            axis
        }
    };

    let values = projection.axis_values(axis);
    let labels = dbscan_1d(&values, params.eps, params.min_samples);

    let wires = cluster_count(&labels);
    info!(
        "Separated {} points into {} wire(s) along axis {} ({} noise)",
        cloud.len(),
        wires,
        axis,
        noise_count(&labels)
    );

    Ok(labels)
}

/// Score all three principal axes and return the best one with every score
///
/// An axis qualifies when it yields at least two clusters; among those the
/// axis with the largest mean cluster size wins (slicing a wire along its
/// length produces many small clusters), then the one with fewer noise
/// points, then the lower index. When no axis yields two clusters the axis
/// clustering the most points is returned.
pub fn select_axis(
    cloud: &PointCloud<Point3d>,
    eps: f64,
    min_samples: usize,
) -> Result<(usize, Vec<AxisScore>)> {
    SeparationParams::new(eps, min_samples, 0).validate()?;
    let projection = project_with_policy(cloud.as_slice(), 3, RankPolicy::AllowDeficient)?;
    let scores = score_axes(&projection, eps, min_samples);
    Ok((best_axis(&scores), scores))
}

fn score_axes(projection: &Projection, eps: f64, min_samples: usize) -> Vec<AxisScore> {
    (0..projection.basis.dimension())
        .map(|axis| {
            let labels = dbscan_1d(&projection.axis_values(axis), eps, min_samples);
            let clusters = cluster_count(&labels);
            let noise = noise_count(&labels);
            let clustered = labels.len() - noise;
            let score = AxisScore {
                axis,
                clusters,
                noise,
                mean_cluster_size: if clusters == 0 { 0.0 } else { clustered as f64 / clusters as f64 },
            };
            debug!("Axis score {score:?}");
            score
        })
        .collect()
}

fn best_axis(scores: &[AxisScore]) -> usize {
    let qualified = scores
        .iter()
        .filter(|s| s.clusters >= 2)
        .min_by(|a, b| {
            b.mean_cluster_size
                .total_cmp(&a.mean_cluster_size)
                .then(a.noise.cmp(&b.noise))
                .then(a.axis.cmp(&b.axis))
        });

    match qualified {
        Some(score) => score.axis,
        None => scores
            .iter()
            .min_by(|a, b| a.noise.cmp(&b.noise).then(a.axis.cmp(&b.axis)))
            .map(|s| s.axis)
            .unwrap_or(0),
    }
}

fn cluster_count(labels: &[WireLabel]) -> usize {
    labels
        .iter()
        .filter_map(|l| l.wire_id())
        .max()
        .map_or(0, |max| max as usize + 1)
}

/// One-dimensional DBSCAN
///
/// Two values are neighbours when they differ by at most `eps`; a core value
/// has at least `min_samples` neighbours including itself. Clusters are the
/// core values connected through chains of neighbours plus the border values
/// next to them; a border value reachable from two clusters joins the one
/// discovered first. Everything else is noise.
pub fn dbscan_1d(values: &[f64], eps: f64, min_samples: usize) -> Vec<WireLabel> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut rank = vec![0usize; n];
    for (r, &i) in order.iter().enumerate() {
        rank[i] = r;
    }
    let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();

    // Neighbourhood of sorted position r is the half-open range windows[r]
    let mut windows = Vec::with_capacity(n);
    let (mut lo, mut hi) = (0usize, 0usize);
    for r in 0..n {
        while sorted[r] - sorted[lo] > eps {
            lo += 1;
        }
        hi = hi.max(r + 1);
        while hi < n && sorted[hi] - sorted[r] <= eps {
            hi += 1;
        }
        windows.push((lo, hi));
    }

    let core: Vec<bool> = windows.iter().map(|&(lo, hi)| hi - lo >= min_samples).collect();

    // In sorted order a cluster is a run of core values with gaps of at most
    // eps; its members are the union of the run's windows, a contiguous range
    let mut component = vec![0usize; n];
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut last_core: Option<usize> = None;
    for r in (0..n).filter(|&r| core[r]) {
        let joins = last_core.is_some_and(|prev| sorted[r] - sorted[prev] <= eps);
        match (joins, spans.last_mut()) {
            (true, Some(span)) => span.1 = windows[r].1,
            _ => spans.push(windows[r]),
        }
        component[r] = spans.len() - 1;
        last_core = Some(r);
    }

    // Ids follow the first core value of each cluster in input order
    let mut ids: Vec<Option<WireId>> = vec![None; spans.len()];
    let mut next_id: WireId = 0;
    for &r in &rank {
        if core[r] && ids[component[r]].is_none() {
            ids[component[r]] = Some(next_id);
            next_id += 1;
        }
    }

    // A border value inside two neighbouring spans keeps the lower id
    let mut assigned: Vec<Option<WireId>> = vec![None; n];
    for (&(lo, hi), id) in spans.iter().zip(&ids) {
        let Some(id) = *id else { continue };
        for slot in &mut assigned[lo..hi] {
            *slot = Some(slot.map_or(id, |current| current.min(id)));
        }
    }

    (0..n)
        .map(|i| assigned[rank[i]].map_or(WireLabel::Noise, WireLabel::Wire))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn two_parallel_lines(offset: f64) -> PointCloud<Point3d> {
        let mut points: Vec<Point3d> = (0..10).map(|x| Point3d::new(x as f64, 0.0, 0.0)).collect();
        points.extend((0..10).map(|x| Point3d::new(x as f64, offset, 0.0)));
        PointCloud::from_points(points)
    }

    #[test]
    fn test_dbscan_1d_two_groups_and_noise() {
        let values = [0.0, 0.05, 0.1, 5.0, 5.05, 5.1, 20.0];
        let labels = dbscan_1d(&values, 0.1, 2);

        assert_eq!(
            labels,
            vec![
                WireLabel::Wire(0),
                WireLabel::Wire(0),
                WireLabel::Wire(0),
                WireLabel::Wire(1),
                WireLabel::Wire(1),
                WireLabel::Wire(1),
                WireLabel::Noise,
            ]
        );
    }

    #[test]
    fn test_dbscan_1d_ids_follow_input_order() {
        let values = [5.0, 0.0, 5.01, 0.01];
        let labels = dbscan_1d(&values, 0.1, 2);
        assert_eq!(labels[0], WireLabel::Wire(0));
        assert_eq!(labels[2], WireLabel::Wire(0));
        assert_eq!(labels[1], WireLabel::Wire(1));
        assert_eq!(labels[3], WireLabel::Wire(1));
    }

    #[test]
    fn test_dbscan_1d_border_point() {
        // 1.0 is only reachable from the core point 0.9, so it is a border point
        let values = [0.8, 0.85, 0.9, 1.0];
        let labels = dbscan_1d(&values, 0.1, 3);
        assert!(labels.iter().all(|l| *l == WireLabel::Wire(0)));

        // With a stricter threshold no point is core
        let labels = dbscan_1d(&values, 0.1, 5);
        assert!(labels.iter().all(|l| l.is_noise()));
    }

    #[test]
    fn test_dbscan_1d_shared_border_joins_first_cluster() {
        // 0.09 is a border value of both the cluster around 0.2 and the one around -0.03
        let values = [0.18, 0.20, 0.22, 0.24, 0.09, 0.0, -0.02, -0.04, -0.06];
        let labels = dbscan_1d(&values, 0.1, 4);
        assert_eq!(labels[0], WireLabel::Wire(0));
        assert_eq!(labels[5], WireLabel::Wire(1));
        assert_eq!(labels[4], WireLabel::Wire(0));

        let reversed: Vec<f64> = values.iter().rev().copied().collect();
        let labels = dbscan_1d(&reversed, 0.1, 4);
        assert_eq!(labels[0], WireLabel::Wire(0));
        assert_eq!(labels[8], WireLabel::Wire(1));
        assert_eq!(labels[4], WireLabel::Wire(0));
    }

    #[test]
    fn test_dbscan_1d_dense_run_is_one_cluster() {
        let values: Vec<f64> = (0..60_000).map(|i| (i % 1000) as f64 * 1e-5).collect();
        let labels = dbscan_1d(&values, 0.1, 5);
        assert!(labels.iter().all(|l| *l == WireLabel::Wire(0)));
    }

    #[test]
    fn test_dbscan_1d_chain_connectivity() {
        let values: Vec<f64> = (0..50).map(|i| i as f64 * 0.09).collect();
        let labels = dbscan_1d(&values, 0.1, 2);
        assert!(labels.iter().all(|l| *l == WireLabel::Wire(0)));
    }

    #[test]
    fn test_dbscan_1d_min_samples_one() {
        let labels = dbscan_1d(&[0.0, 10.0], 0.5, 1);
        assert_eq!(labels, vec![WireLabel::Wire(0), WireLabel::Wire(1)]);
    }

    #[test]
    fn test_separate_two_parallel_lines() {
        let cloud = two_parallel_lines(1.0);
        let labels = separate(&cloud, &SeparationParams::new(0.5, 2, 1)).unwrap();

        assert_eq!(labels.len(), 20);
        assert_eq!(noise_count(&labels), 0);

        let unique: HashSet<_> = labels.iter().filter_map(|l| l.wire_id()).collect();
        assert_eq!(unique.len(), 2);

        // Each line maps to exactly one label
        assert!(labels[..10].iter().all(|l| *l == labels[0]));
        assert!(labels[10..].iter().all(|l| *l == labels[10]));
        assert_ne!(labels[0], labels[10]);
    }

    #[test]
    fn test_separate_is_deterministic() {
        let cloud = two_parallel_lines(2.0);
        let params = SeparationParams::new(0.5, 2, 1);
        let a = separate(&cloud, &params).unwrap();
        let b = separate(&cloud, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_separate_wrong_axis_degrades_silently() {
        let cloud = two_parallel_lines(1.0);
        // Axis 2 carries no variance, every point collapses onto one cluster
        let labels = separate(&cloud, &SeparationParams::new(0.5, 2, 2)).unwrap();
        assert!(labels.iter().all(|l| *l == WireLabel::Wire(0)));
    }

    #[test]
    fn test_separate_empty_and_tiny() {
        let empty = PointCloud::new();
        assert!(separate(&empty, &SeparationParams::default()).unwrap().is_empty());

        let tiny = PointCloud::from_points(vec![Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 0.0, 0.0)]);
        assert!(matches!(
            separate(&tiny, &SeparationParams::default()),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let cloud = two_parallel_lines(1.0);
        assert!(separate(&cloud, &SeparationParams::new(0.0, 2, 1)).is_err());
        assert!(separate(&cloud, &SeparationParams::new(f64::NAN, 2, 1)).is_err());
        assert!(separate(&cloud, &SeparationParams::new(0.5, 0, 1)).is_err());
        assert!(separate(&cloud, &SeparationParams::new(0.5, 2, 3)).is_err());
    }

    #[test]
    fn test_auto_axis_prefers_cross_wire_axis() {
        let cloud = two_parallel_lines(1.0);
        let (axis, scores) = select_axis(&cloud, 0.5, 2).unwrap();

        assert_eq!(scores.len(), 3);
        // Along the lines every x position forms its own small cluster
        assert_eq!(scores[0].clusters, 10);
        assert_eq!(scores[1].clusters, 2);
        assert_eq!(axis, 1);

        let params = SeparationParams::new(0.5, 2, 0).with_axis(AxisChoice::Auto);
        let auto = separate(&cloud, &params).unwrap();
        let fixed = separate(&cloud, &SeparationParams::new(0.5, 2, 1)).unwrap();
        assert_eq!(auto, fixed);
    }

    #[test]
    fn test_best_axis_fallback_prefers_fewest_noise() {
        let score = |axis, clusters, noise| AxisScore {
            axis,
            clusters,
            noise,
            mean_cluster_size: 0.0,
        };
        assert_eq!(best_axis(&[score(0, 1, 5), score(1, 0, 10), score(2, 1, 2)]), 2);
        assert_eq!(best_axis(&[score(0, 0, 4), score(1, 1, 4), score(2, 1, 4)]), 0);
    }

    #[test]
    fn test_auto_axis_without_separable_wires() {
        // A compact blob gives a single cluster along every axis
        let mut points = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    points.push(Point3d::new(i as f64 * 0.1, j as f64 * 0.1, k as f64 * 0.1));
                }
            }
        }
        let cloud = PointCloud::from_points(points);

        let (axis, scores) = select_axis(&cloud, 1.0, 2).unwrap();
        assert!(scores.iter().all(|s| s.clusters == 1 && s.noise == 0));
        assert_eq!(axis, 0);

        let params = SeparationParams::new(1.0, 2, 1).with_axis(AxisChoice::Auto);
        let labels = separate(&cloud, &params).unwrap();
        assert!(labels.iter().all(|l| *l == WireLabel::Wire(0)));
    }
}
