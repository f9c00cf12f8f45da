//! I/O operations for wirecrate
//!
//! This crate reads point tables (CSV, XYZ and whitespace separated TXT)
//! and exports separation and fitting results as CSV and OBJ files.

pub mod xyz_csv;
pub mod export;

pub use export::*;
pub use xyz_csv::{
    ColumnType, Delimiter, PointTable, XyzCsvReader, XyzCsvSchema, XyzCsvWriteOptions, XyzCsvWriter,
};

use std::path::Path;
use wirecrate_core::{Error, Point3d, PointCloud, Result};

/// Trait for point table readers
pub trait PointCloudReader {
    /// Read points and optional labels
    fn read_table(&self, path: &Path) -> Result<PointTable>;

    /// Whether this reader handles the file's extension
    fn can_read(&self, path: &Path) -> bool;

    fn format_name(&self) -> &'static str;
}

impl PointCloudReader for XyzCsvReader {
    fn read_table(&self, path: &Path) -> Result<PointTable> {
        XyzCsvReader::read_table(path)
    }

    fn can_read(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
            matches!(ext.to_lowercase().as_str(), "xyz" | "csv" | "txt")
        } else {
            false
        }
    }

    fn format_name(&self) -> &'static str {
        "xyz_csv"
    }
}

/// Auto-detect format and read points with optional labels
pub fn read_point_table<P: AsRef<Path>>(path: P) -> Result<PointTable> {
    let path = path.as_ref();
    let reader = XyzCsvReader;
    if reader.can_read(path) {
        reader.read_table(path)
    } else {
        Err(Error::UnsupportedFormat(format!(
            "Unsupported point cloud format: {:?}",
            path.extension()
        )))
    }
}

/// Auto-detect format and read a point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
    Ok(read_point_table(path)?.cloud)
}
