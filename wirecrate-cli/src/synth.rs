//! Synthetic multi-wire point tables for demos and smoke tests

use anyhow::{ensure, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use wirecrate_core::{linspace, CatenaryParams, Point3d, PointCloud, Vector3d, WireLabel};

#[derive(Parser, Debug)]
pub struct SynthArgs {
    /// Output table (.csv, .xyz or .txt)
    pub output: PathBuf,

    /// Number of parallel wires
    #[arg(long, default_value = "4")]
    pub wires: usize,

    /// Horizontal distance between neighbouring wires
    #[arg(long, default_value = "2.0")]
    pub spacing: f64,

    /// Span length along x
    #[arg(long, default_value = "40.0")]
    pub span: f64,

    /// Points per wire
    #[arg(long, default_value = "200")]
    pub points: usize,

    /// Catenary parameter c; larger values sag less
    #[arg(long, default_value = "50.0")]
    pub sag: f64,

    /// Height of the lowest point
    #[arg(long, default_value = "12.0")]
    pub height: f64,

    /// Uniform jitter added to every coordinate
    #[arg(long, default_value = "0.02")]
    pub noise: f64,

    /// Number of isolated outlier points
    #[arg(long, default_value = "0")]
    pub outliers: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Include the ground-truth wire column
    #[arg(long)]
    pub labels: bool,
}

/// Generate hanging wires along x, offset along y, plus scattered outliers
pub fn generate(args: &SynthArgs) -> Result<(PointCloud<Point3d>, Vec<WireLabel>)> {
    ensure!(args.wires > 0 && args.points >= 2, "need at least one wire with two points");
    ensure!(args.spacing > 0.0 && args.span > 0.0, "spacing and span must be positive");
    ensure!(args.sag.is_finite() && args.sag != 0.0, "sag must be finite and non-zero");
    ensure!(args.noise >= 0.0, "noise must be non-negative");

    let mut rng = StdRng::seed_from_u64(args.seed);
    let sag = CatenaryParams {
        x0: 0.0,
        y0: args.height,
        c: args.sag,
    };
    let half = args.span / 2.0;

    let mut cloud = PointCloud::new();
    let mut labels = Vec::with_capacity(args.wires * args.points + args.outliers);

    for wire in 0..args.wires {
        let offset = wire as f64 * args.spacing;
        for x in linspace(-half, half, args.points) {
            let point = Point3d::new(x, offset, sag.evaluate(x));
            cloud.push(point + jitter(&mut rng, args.noise));
            labels.push(WireLabel::Wire(wire as u32));
        }
    }

    // Outliers sit above and beside the wires so they never join a wire
    let width = args.spacing * args.wires as f64;
    for _ in 0..args.outliers {
        let point = Point3d::new(
            rng.gen_range(-half..=half),
            rng.gen_range(width + args.spacing..=2.0 * width + args.spacing),
            args.height + rng.gen_range(5.0..15.0),
        );
        cloud.push(point);
        labels.push(WireLabel::Noise);
    }

    Ok((cloud, labels))
}

fn jitter(rng: &mut StdRng, noise: f64) -> Vector3d {
    if noise > 0.0 {
        Vector3d::new(
            rng.gen_range(-noise..noise),
            rng.gen_range(-noise..noise),
            rng.gen_range(-noise..noise),
        )
    } else {
        Vector3d::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_generate_counts_and_determinism() {
        let args = SynthArgs::parse_from(["synth", "out.csv", "--wires", "3", "--points", "50", "--outliers", "4"]);
        let (cloud, labels) = generate(&args).unwrap();
        assert_eq!(cloud.len(), 154);
        assert_eq!(labels.len(), 154);
        assert_eq!(labels.iter().filter(|l| l.is_noise()).count(), 4);
        assert_eq!(labels[50], WireLabel::Wire(1));

        let (again, _) = generate(&args).unwrap();
        assert_eq!(cloud, again);
    }

    #[test]
    fn test_noise_free_points_lie_on_the_curve() {
        let args = SynthArgs::parse_from(["synth", "out.csv", "--noise", "0", "--wires", "1"]);
        let (cloud, _) = generate(&args).unwrap();
        for p in cloud.iter() {
            assert!((p.z - (12.0 + 50.0 * ((p.x / 50.0).cosh() - 1.0))).abs() < 1e-12);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let args = SynthArgs::parse_from(["synth", "out.csv", "--wires", "0"]);
        assert!(generate(&args).is_err());
        let args = SynthArgs::parse_from(["synth", "out.csv", "--spacing=-1"]);
        assert!(generate(&args).is_err());
    }
}
