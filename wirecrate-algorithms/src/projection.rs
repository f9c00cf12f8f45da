//! Principal-axis projection
//!
//! Projects a 3D point set onto its top-k directions of maximum variance and
//! maps plane coordinates back into the ambient frame. The separator uses the
//! three principal axes of the whole cloud; the curve fitter uses the two
//! leading axes of each individual wire.

use log::debug;
use nalgebra::{DMatrix, Matrix3, Vector3};
use wirecrate_core::{is_finite_point, Error, Point3d, Result};

/// Eigenvalues below this fraction of the dominant one count as zero variance
const RANK_TOLERANCE: f64 = 1e-10;

/// How `project_with_policy` treats point sets with fewer than k directions of variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankPolicy {
    /// Fail with `Error::DegenerateInput`
    #[default]
    Strict,
    /// Return the zero-variance trailing axes as well
    AllowDeficient,
}

/// Orthonormal principal axes of a point set plus its centering mean
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionBasis {
    mean: Point3d,
    axes: Vec<Vector3<f64>>,
    explained_variance: Vec<f64>,
}

impl ProjectionBasis {
    /// Centering mean of the source points
    pub fn mean(&self) -> &Point3d {
        &self.mean
    }

    /// Unit axes ordered by descending explained variance
    pub fn axes(&self) -> &[Vector3<f64>] {
        &self.axes
    }

    /// Sample variance along each axis
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Number of retained axes
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Coordinates of a single point along the retained axes
    pub fn project_point(&self, point: &Point3d) -> Vec<f64> {
        let centered = point - self.mean;
        self.axes.iter().map(|axis| centered.dot(axis)).collect()
    }

    /// Map coordinates (one row per point) back into the ambient 3D frame
    ///
    /// Exact only for points that lie in the subspace spanned by the basis.
    pub fn inverse_project(&self, coordinates: &DMatrix<f64>) -> Result<Vec<Point3d>> {
        if coordinates.ncols() != self.dimension() {
            return Err(Error::InvalidData(format!(
                "expected {} coordinate columns, found {}",
                self.dimension(),
                coordinates.ncols()
            )));
        }

        Ok(coordinates
            .row_iter()
            .map(|row| {
                let offset = self
                    .axes
                    .iter()
                    .zip(row.iter())
                    .fold(Vector3::zeros(), |acc, (axis, &c)| acc + axis * c);
                self.mean + offset
            })
            .collect())
    }
}

/// Projected coordinates together with the basis that produced them
#[derive(Debug, Clone)]
pub struct Projection {
    /// N×k matrix, row i holds point i's coordinates
    pub coordinates: DMatrix<f64>,
    pub basis: ProjectionBasis,
}

impl Projection {
    /// Coordinates of every point along axis `index`
    pub fn axis_values(&self, index: usize) -> Vec<f64> {
        self.coordinates.column(index).iter().copied().collect()
    }
}

/// Project `points` onto their top `k` principal axes
///
/// Fails with `Error::DegenerateInput` when there are fewer than `k` points,
/// when any coordinate is non-finite, or when the points span fewer than `k`
/// directions (for example collinear points with `k = 2`).
///
/// # Example
/// ```rust
/// use wirecrate_core::Point3d;
/// use wirecrate_algorithms::projection::project;
///
/// let points = vec![
///     Point3d::new(0.0, 0.0, 0.0),
///     Point3d::new(1.0, 0.0, 0.1),
///     Point3d::new(2.0, 0.0, 0.0),
/// ];
/// let projection = project(&points, 2).unwrap();
/// assert_eq!(projection.coordinates.shape(), (3, 2));
/// ```
pub fn project(points: &[Point3d], k: usize) -> Result<Projection> {
    project_with_policy(points, k, RankPolicy::Strict)
}

/// Project `points` onto their top `k` principal axes with an explicit rank policy
pub fn project_with_policy(points: &[Point3d], k: usize, policy: RankPolicy) -> Result<Projection> {
    if k == 0 || k > 3 {
        return Err(Error::InvalidParameter(format!(
            "projection dimension must be 1, 2 or 3, got {k}"
        )));
    }
    if points.len() < k {
        return Err(Error::DegenerateInput(format!(
            "need at least {k} points for a {k}-axis projection, got {}",
            points.len()
        )));
    }
    if !points.iter().all(is_finite_point) {
        return Err(Error::DegenerateInput(
            "point set contains non-finite coordinates".to_string(),
        ));
    }

    let n = points.len() as f64;
    let mean = Point3d::from(points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n);

    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p - mean;
        covariance += d * d.transpose();
    }
    covariance /= (n - 1.0).max(1.0);

    let eigen = covariance.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let variances: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i].max(0.0)).collect();
    let dominant = variances[0];
    let rank = variances
        .iter()
        .filter(|&&v| dominant > 0.0 && v > RANK_TOLERANCE * dominant)
        .count();

    if rank < k && policy == RankPolicy::Strict {
        return Err(Error::DegenerateInput(format!(
            "point set spans {rank} direction(s) of variance, {k} required"
        )));
    }

    let axes: Vec<Vector3<f64>> = order[..k]
        .iter()
        .map(|&i| canonical_sign(eigen.eigenvectors.column(i).normalize()))
        .collect();

    debug!(
        "Projected {} points onto {} axes, explained variance {:?}",
        points.len(),
        k,
        &variances[..k]
    );

    let coordinates = DMatrix::from_fn(points.len(), k, |row, col| (points[row] - mean).dot(&axes[col]));

    Ok(Projection {
        coordinates,
        basis: ProjectionBasis {
            mean,
            axes,
            explained_variance: variances[..k].to_vec(),
        },
    })
}

/// Flip an axis so that its largest-magnitude component is positive
fn canonical_sign(axis: Vector3<f64>) -> Vector3<f64> {
    let dominant = axis.iamax();
    if axis[dominant] < 0.0 {
        -axis
    } else {
        axis
    }
}
