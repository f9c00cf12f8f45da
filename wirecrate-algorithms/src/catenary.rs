//! Catenary least-squares fitting
//!
//! Fits `z = y0 + c * (cosh((x - x0) / c) - 1)` to planar samples with a
//! Levenberg-Marquardt solver using the analytic Jacobian. The model is
//! non-convex and very sensitive to `c`: `cosh` grows fast, so steps that
//! overflow or drive `c` to zero are rejected and the damping raised.

use log::debug;
use nalgebra::{Matrix3, Vector3};
use wirecrate_core::{CatenaryParams, Error, Result};

/// Damping above this value means no descent step can be found
const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-12;
/// Relative floor for the diagonal scaling of flat Jacobian columns
const DIAG_FLOOR: f64 = 1e-12;

/// Solver settings for catenary fitting
#[derive(Debug, Clone, PartialEq)]
pub struct CatenaryFitOptions {
    /// Seed for the curvature parameter `c`
    pub initial_c: f64,
    /// Maximum number of outer iterations
    pub max_iterations: usize,
    /// Relative cost reduction tolerance
    pub ftol: f64,
    /// Relative step size tolerance
    pub xtol: f64,
    /// Gradient infinity-norm tolerance
    pub gtol: f64,
    /// Starting Marquardt damping factor
    pub initial_damping: f64,
}

impl Default for CatenaryFitOptions {
    fn default() -> Self {
        Self {
            initial_c: 10.0,
            max_iterations: 800,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 1.49012e-8,
            initial_damping: 1e-3,
        }
    }
}

impl CatenaryFitOptions {
    /// Set the seed for `c`
    pub fn with_initial_c(mut self, initial_c: f64) -> Self {
        self.initial_c = initial_c;
        self
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_c.is_finite() || self.initial_c == 0.0 {
            return Err(Error::InvalidParameter(format!(
                "initial_c must be finite and non-zero, got {}",
                self.initial_c
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        for (name, value) in [("ftol", self.ftol), ("xtol", self.xtol), ("gtol", self.gtol)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !(self.initial_damping.is_finite() && self.initial_damping > 0.0) {
            return Err(Error::InvalidParameter(
                "initial_damping must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converged catenary fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatenaryFit {
    pub params: CatenaryParams,
    pub iterations: usize,
    /// Root mean squared residual at the solution
    pub rmse: f64,
}

/// Evaluate the catenary model at `x`
pub fn catenary(x: f64, params: &CatenaryParams) -> f64 {
    params.evaluate(x)
}

/// Partial derivatives of the model at `x` with respect to `(x0, y0, c)`
pub fn catenary_jacobian(x: f64, params: &CatenaryParams) -> Vector3<f64> {
    let u = (x - params.x0) / params.c;
    let (sinh, cosh) = (u.sinh(), u.cosh());
    Vector3::new(-sinh, 1.0, cosh - 1.0 - u * sinh)
}

/// Deterministic starting point: mean of `x`, minimum of `z`, fixed `c`
pub fn initial_guess(x: &[f64], z: &[f64], initial_c: f64) -> CatenaryParams {
    let x0 = x.iter().sum::<f64>() / x.len().max(1) as f64;
    let y0 = z.iter().copied().fold(f64::INFINITY, f64::min);
    CatenaryParams { x0, y0, c: initial_c }
}

/// Fit catenary parameters to the samples `(x[i], z[i])`
///
/// Starts from `initial_guess` and runs a single Levenberg-Marquardt
/// descent; there are no restarts. Fails with `Error::FitNonConvergence`
/// when no descent step can be found or the iteration budget runs out.
///
/// # Arguments
/// * `x` - In-plane abscissae
/// * `z` - In-plane heights, same length as `x`
/// * `options` - Seed and solver tolerances
///
/// # Returns
/// * `Result<CatenaryFit>` - Fitted parameters with iteration count and residual
///
/// # Example
/// ```rust
/// use wirecrate_core::CatenaryParams;
/// use wirecrate_algorithms::catenary::{fit_catenary, CatenaryFitOptions};
///
/// let truth = CatenaryParams { x0: 0.0, y0: 0.0, c: 10.0 };
/// let x: Vec<f64> = (0..100).map(|i| -5.0 + 10.0 * i as f64 / 99.0).collect();
/// let z: Vec<f64> = x.iter().map(|&xi| truth.evaluate(xi)).collect();
///
/// let fit = fit_catenary(&x, &z, &CatenaryFitOptions::default()).unwrap();
/// assert!((fit.params.c - 10.0).abs() < 1e-2);
/// ```
pub fn fit_catenary(x: &[f64], z: &[f64], options: &CatenaryFitOptions) -> Result<CatenaryFit> {
    options.validate()?;
    if x.len() != z.len() {
        return Err(Error::InvalidData(format!(
            "x and z must have the same length ({} != {})",
            x.len(),
            z.len()
        )));
    }
    if x.len() < 3 {
        return Err(Error::DegenerateInput(format!(
            "need at least 3 samples to fit 3 parameters, got {}",
            x.len()
        )));
    }
    if !x.iter().chain(z.iter()).all(|v| v.is_finite()) {
        return Err(Error::DegenerateInput("samples contain non-finite values".to_string()));
    }

    let seed = initial_guess(x, z, options.initial_c);
    let mut p = Vector3::new(seed.x0, seed.y0, seed.c);
    let mut cost = sum_of_squares(x, z, &p).ok_or_else(|| Error::FitNonConvergence {
        iterations: 0,
        reason: "model is not finite at the initial guess".to_string(),
    })?;
    let mut damping = options.initial_damping;

    for iteration in 1..=options.max_iterations {
        if cost == 0.0 {
            return Ok(finish(&p, cost, x.len(), iteration - 1));
        }

        let (jtj, gradient) = normal_equations(x, z, &p);
        if !(jtj.iter().all(|v| v.is_finite()) && gradient.iter().all(|v| v.is_finite())) {
            return Err(Error::FitNonConvergence {
                iterations: iteration,
                reason: "Jacobian is not finite".to_string(),
            });
        }
        if gradient.amax() <= options.gtol {
            return Ok(finish(&p, cost, x.len(), iteration - 1));
        }

        let max_diag = jtj.diagonal().max();
        let scale = jtj
            .diagonal()
            .map(|d| d.max(DIAG_FLOOR * max_diag).max(f64::MIN_POSITIVE));

        loop {
            let mut system = jtj;
            for i in 0..3 {
                system[(i, i)] += damping * scale[i];
            }

            let step = match system.cholesky() {
                Some(cholesky) => cholesky.solve(&(-gradient)),
                None => {
                    damping *= 10.0;
                    if damping > MAX_DAMPING {
                        return Err(singular(iteration));
                    }
                    continue;
                }
            };

            let candidate = p + step;
            let small_step = step.norm() <= options.xtol * (p.norm() + options.xtol);

            match sum_of_squares(x, z, &candidate) {
                Some(new_cost) if candidate[2] != 0.0 && new_cost <= cost => {
                    let actual = (cost - new_cost) / cost;
                    let predicted = -(2.0 * step.dot(&gradient) + (step.transpose() * jtj * step)[(0, 0)]) / cost;

                    p = candidate;
                    cost = new_cost;
                    damping = (damping / 10.0).max(MIN_DAMPING);

                    if small_step || (actual <= options.ftol && predicted.abs() <= options.ftol) {
                        return Ok(finish(&p, cost, x.len(), iteration));
                    }
                    break;
                }
                _ => {
                    if small_step {
                        return Ok(finish(&p, cost, x.len(), iteration));
                    }
                    damping *= 10.0;
                    if damping > MAX_DAMPING {
                        return Err(singular(iteration));
                    }
                }
            }
        }
    }

    Err(Error::FitNonConvergence {
        iterations: options.max_iterations,
        reason: "iteration budget exhausted".to_string(),
    })
}

fn finish(p: &Vector3<f64>, cost: f64, n: usize, iterations: usize) -> CatenaryFit {
    let fit = CatenaryFit {
        params: CatenaryParams { x0: p[0], y0: p[1], c: p[2] },
        iterations,
        rmse: (cost / n as f64).sqrt(),
    };
    debug!(
        "Catenary fit converged after {} iterations: {:?}, rmse {:.3e}",
        fit.iterations, fit.params, fit.rmse
    );
    fit
}

fn singular(iteration: usize) -> Error {
    Error::FitNonConvergence {
        iterations: iteration,
        reason: "no descent step found (singular or ill-conditioned normal equations)".to_string(),
    }
}

/// Sum of squared residuals, `None` when the model is not finite or `c` is zero
fn sum_of_squares(x: &[f64], z: &[f64], p: &Vector3<f64>) -> Option<f64> {
    if p[2] == 0.0 {
        return None;
    }
    let params = CatenaryParams { x0: p[0], y0: p[1], c: p[2] };
    let cost: f64 = x
        .iter()
        .zip(z.iter())
        .map(|(&xi, &zi)| {
            let r = params.evaluate(xi) - zi;
            r * r
        })
        .sum();
    cost.is_finite().then_some(cost)
}

/// `J^T J` and `J^T r` for residuals `r = model - z`
fn normal_equations(x: &[f64], z: &[f64], p: &Vector3<f64>) -> (Matrix3<f64>, Vector3<f64>) {
    let params = CatenaryParams { x0: p[0], y0: p[1], c: p[2] };
    let mut jtj = Matrix3::zeros();
    let mut gradient = Vector3::zeros();
    for (&xi, &zi) in x.iter().zip(z.iter()) {
        let row = catenary_jacobian(xi, &params);
        let r = params.evaluate(xi) - zi;
        jtj += row * row.transpose();
        gradient += row * r;
    }
    (jtj, gradient)
}
