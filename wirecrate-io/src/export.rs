//! Export of separation and fitting results
//!
//! Writes plain-text artifacts that any spreadsheet, GIS tool or mesh viewer
//! can open: labeled points, sampled curves, fitted parameters and OBJ
//! polylines.

use crate::xyz_csv::{XyzCsvWriteOptions, XyzCsvWriter};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use wirecrate_core::{Point3d, PointCloud, Result, WireFitReport, WireLabel};

/// Files produced by `export_report`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub points: PathBuf,
    pub curves: PathBuf,
    pub params: PathBuf,
    pub obj: PathBuf,
}

impl ExportPaths {
    /// Paths for dataset `name` inside `dir`
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            points: dir.join(format!("{name}_points.csv")),
            curves: dir.join(format!("{name}_curves.csv")),
            params: dir.join(format!("{name}_params.csv")),
            obj: dir.join(format!("{name}_curves.obj")),
        }
    }
}

/// Write every point with its wire id (`x,y,z,wire`, -1 for noise)
pub fn write_labeled_points<P: AsRef<Path>>(
    path: P,
    cloud: &PointCloud<Point3d>,
    labels: &[WireLabel],
) -> Result<()> {
    XyzCsvWriter::write_labeled_points(cloud, labels, path, &XyzCsvWriteOptions::csv_with_header())
}

/// Write the sampled curves, one row per sample (`wire,sample,x,y,z`)
pub fn write_curves_csv<P: AsRef<Path>>(path: P, report: &WireFitReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "wire,sample,x,y,z")?;
    for (id, wire) in &report.wires {
        for (sample, p) in wire.curve.iter().enumerate() {
            writeln!(writer, "{},{},{},{},{}", id, sample, p.x, p.y, p.z)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write one row of fitted parameters per wire
/// (`wire,x0,y0,c,points,rmse,iterations`)
pub fn write_params_csv<P: AsRef<Path>>(path: P, report: &WireFitReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "wire,x0,y0,c,points,rmse,iterations")?;
    for (id, wire) in &report.wires {
        let [x0, y0, c] = wire.params.to_array();
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            id,
            x0,
            y0,
            c,
            wire.points.len(),
            wire.rmse,
            wire.iterations
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the sampled curves as Wavefront OBJ polylines, one `l` element per wire
pub fn write_curves_obj<P: AsRef<Path>>(path: P, report: &WireFitReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "# wirecrate fitted wires: {}", report.len())?;

    // OBJ vertex indices are 1-based and global to the file
    let mut next_index = 1usize;
    for (id, wire) in &report.wires {
        writeln!(writer, "o wire_{id}")?;
        for p in &wire.curve {
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        if wire.curve.len() >= 2 {
            write!(writer, "l")?;
            for i in next_index..next_index + wire.curve.len() {
                write!(writer, " {i}")?;
            }
            writeln!(writer)?;
        }
        next_index += wire.curve.len();
    }

    writer.flush()?;
    Ok(())
}

/// Write labeled points, curves, parameters and OBJ polylines for one dataset
///
/// Creates `dir` when it does not exist.
pub fn export_report<P: AsRef<Path>>(
    dir: P,
    name: &str,
    cloud: &PointCloud<Point3d>,
    labels: &[WireLabel],
    report: &WireFitReport,
) -> Result<ExportPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let paths = ExportPaths::new(dir, name);
    write_labeled_points(&paths.points, cloud, labels)?;
    write_curves_csv(&paths.curves, report)?;
    write_params_csv(&paths.params, report)?;
    write_curves_obj(&paths.obj, report)?;

    info!("Exported {} wires for '{}' to {}", report.len(), name, dir.display());
    Ok(paths)
}
