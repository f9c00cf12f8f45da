//! Catenary curve model
//!
//! A hanging cable in its own vertical plane follows
//! `z = y0 + c * (cosh((x - x0) / c) - 1)`, where `(x0, y0)` is the lowest
//! point and `c` sets how steeply the curve rises away from it.

use crate::error::{Error, Result};
use crate::point::Point2d;
use serde::{Deserialize, Serialize};

/// Parameters of a planar catenary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatenaryParams {
    /// Abscissa of the lowest point
    pub x0: f64,
    /// Height of the lowest point
    pub y0: f64,
    /// Curvature parameter, non-zero
    pub c: f64,
}

impl CatenaryParams {
    /// Create parameters, rejecting a zero or non-finite `c`
    pub fn new(x0: f64, y0: f64, c: f64) -> Result<Self> {
        let params = Self { x0, y0, c };
        params.validate()?;
        Ok(params)
    }

    /// Check that all parameters are finite and `c` is non-zero
    pub fn validate(&self) -> Result<()> {
        if !(self.x0.is_finite() && self.y0.is_finite() && self.c.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "catenary parameters must be finite: {self:?}"
            )));
        }
        if self.c == 0.0 {
            return Err(Error::InvalidParameter(
                "catenary parameter c must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Evaluate the curve height at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.y0 + self.c * (((x - self.x0) / self.c).cosh() - 1.0)
    }

    /// Sample `count` evenly spaced points over `[x_min, x_max]`, both ends included
    pub fn sample(&self, x_min: f64, x_max: f64, count: usize) -> Vec<Point2d> {
        linspace(x_min, x_max, count)
            .into_iter()
            .map(|x| Point2d::new(x, self.evaluate(x)))
            .collect()
    }

    /// As a plain `[x0, y0, c]` triple
    pub fn to_array(&self) -> [f64; 3] {
        [self.x0, self.y0, self.c]
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive
///
/// A single sample is placed at `start`. The last value is exactly `end`.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluate_vertex_and_symmetry() {
        let params = CatenaryParams::new(2.0, -1.0, 5.0).unwrap();
        assert_relative_eq!(params.evaluate(2.0), -1.0);
        assert_relative_eq!(params.evaluate(0.5), params.evaluate(3.5), epsilon = 1e-12);
        assert!(params.evaluate(4.0) > params.evaluate(3.0));
    }

    #[test]
    fn test_rejects_zero_c() {
        assert!(CatenaryParams::new(0.0, 0.0, 0.0).is_err());
        assert!(CatenaryParams::new(f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_to_array_order() {
        let params = CatenaryParams::new(1.5, -2.0, 8.0).unwrap();
        assert_eq!(params.to_array(), [1.5, -2.0, 8.0]);
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-5.0, 5.0, 300);
        assert_eq!(xs.len(), 300);
        assert_eq!(xs[0], -5.0);
        assert_eq!(xs[299], 5.0);
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));

        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }

    #[test]
    fn test_sample_follows_model() {
        let params = CatenaryParams::new(0.0, 1.0, 10.0).unwrap();
        let samples = params.sample(-1.0, 1.0, 5);
        assert_eq!(samples.len(), 5);
        for p in &samples {
            assert_relative_eq!(p.y, params.evaluate(p.x));
        }
    }
}
