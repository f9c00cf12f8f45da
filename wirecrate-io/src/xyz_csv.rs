//! XYZ/CSV point table support
//!
//! This module reads and writes plain-text point tables:
//! - Auto-detection of delimiters (comma, space, tab, semicolon)
//! - Header detection with column aliases for x, y, z
//! - An optional wire label column (`cluster`, `label` or `wire`)
//! - Headerless files are read as x, y, z followed by ignored columns

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use wirecrate_core::{Error, Point3d, PointCloud, Result, WireLabel};

/// Supported delimiters for CSV/XYZ files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Space,
    Tab,
    Semicolon,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Space => ' ',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
        }
    }

    /// Detect delimiter from a line of text
    ///
    /// The most frequent candidate wins; ties go to comma, then tab,
    /// semicolon and space, so `x, y, z` is read as comma separated.
    pub fn detect_from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut best: Option<(usize, Delimiter)> = None;
        for delimiter in [Delimiter::Comma, Delimiter::Tab, Delimiter::Semicolon, Delimiter::Space] {
            let count = line.matches(delimiter.as_char()).count();
            if count > 0 && best.map_or(true, |(top, _)| count > top) {
                best = Some((count, delimiter));
            }
        }
        best.map(|(_, delimiter)| delimiter)
    }

    /// Split a line into trimmed fields
    ///
    /// Runs of whitespace count as a single separator for `Space`.
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Space => line.split_whitespace().collect(),
            _ => line.split(self.as_char()).map(str::trim).collect(),
        }
    }
}

/// Column types that can be parsed from XYZ/CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    X,
    Y,
    Z,
    /// Integer wire id, negative for noise
    Label,
    Unknown,
}

impl ColumnType {
    /// Parse column type from header name
    pub fn from_header(header: &str) -> Self {
        let header_lower = header.to_lowercase();
        match header_lower.trim() {
            "x" | "px" | "pos_x" | "position_x" => ColumnType::X,
            "y" | "py" | "pos_y" | "position_y" => ColumnType::Y,
            "z" | "pz" | "pos_z" | "position_z" => ColumnType::Z,
            "cluster" | "label" | "wire" | "wire_id" => ColumnType::Label,
            _ => ColumnType::Unknown,
        }
    }

    /// Header name written for this column
    pub fn header_name(&self) -> &'static str {
        match self {
            ColumnType::X => "x",
            ColumnType::Y => "y",
            ColumnType::Z => "z",
            ColumnType::Label => "wire",
            ColumnType::Unknown => "unknown",
        }
    }
}

/// Schema definition for parsing XYZ/CSV files
#[derive(Debug, Clone, PartialEq)]
pub struct XyzCsvSchema {
    pub columns: Vec<ColumnType>,
    pub has_header: bool,
    pub delimiter: Delimiter,
}

impl XyzCsvSchema {
    /// Create a new schema
    pub fn new(columns: Vec<ColumnType>, has_header: bool, delimiter: Delimiter) -> Self {
        Self {
            columns,
            has_header,
            delimiter,
        }
    }

    /// Auto-detect schema from the first non-empty line of a file
    pub fn detect_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                return Self::detect_from_line(&line);
            }
        }

        Err(Error::InvalidData(format!(
            "{} contains no data",
            path.as_ref().display()
        )))
    }

    /// Auto-detect schema from a single line (header or first data row)
    pub fn detect_from_line(line: &str) -> Result<Self> {
        let delimiter = Delimiter::detect_from_line(line)
            .ok_or_else(|| Error::InvalidData("Could not detect delimiter".to_string()))?;

        let has_header = Self::is_header_line(line, delimiter);

        let columns = if has_header {
            Self::parse_columns(line, delimiter)?
        } else {
            // Headerless tables are x, y, z followed by anything
            let count = delimiter.split(line).len();
            let mut columns = vec![ColumnType::X, ColumnType::Y, ColumnType::Z];
            columns.extend(std::iter::repeat(ColumnType::Unknown).take(count.saturating_sub(3)));
            columns
        };

        Ok(Self::new(columns, has_header, delimiter))
    }

    /// Index of the first column of the given type
    pub fn index_of(&self, column: ColumnType) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Whether the table carries a wire label column
    pub fn has_labels(&self) -> bool {
        self.index_of(ColumnType::Label).is_some()
    }

    fn coordinate_indices(&self) -> Result<[usize; 3]> {
        let find = |column: ColumnType| {
            self.index_of(column).ok_or_else(|| {
                Error::InvalidData(format!("Missing {} column", column.header_name()))
            })
        };
        Ok([find(ColumnType::X)?, find(ColumnType::Y)?, find(ColumnType::Z)?])
    }

    /// Parse columns from a header line
    fn parse_columns(line: &str, delimiter: Delimiter) -> Result<Vec<ColumnType>> {
        let columns: Vec<ColumnType> = delimiter
            .split(line)
            .into_iter()
            .map(ColumnType::from_header)
            .collect();

        let has_x = columns.contains(&ColumnType::X);
        let has_y = columns.contains(&ColumnType::Y);
        let has_z = columns.contains(&ColumnType::Z);

        if !has_x || !has_y || !has_z {
            return Err(Error::InvalidData(
                "XYZ/CSV file must contain x, y, z columns".to_string(),
            ));
        }

        Ok(columns)
    }

    /// A line is a header when any of its first three fields is not numeric
    fn is_header_line(line: &str, delimiter: Delimiter) -> bool {
        let parts = delimiter.split(line);
        if parts.len() < 3 {
            return false;
        }
        parts.iter().take(3).any(|part| part.parse::<f64>().is_err())
    }
}

/// Points read from a table, with labels when the table has a label column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointTable {
    pub cloud: PointCloud<Point3d>,
    /// One label per point, `None` when the file has no label column
    pub labels: Option<Vec<WireLabel>>,
}

/// XYZ/CSV reader implementation
pub struct XyzCsvReader;

impl XyzCsvReader {
    /// Read a point cloud from an XYZ/CSV file with auto-detection
    pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
        Ok(Self::read_table(path)?.cloud)
    }

    /// Read points and optional labels with auto-detection
    pub fn read_table<P: AsRef<Path>>(path: P) -> Result<PointTable> {
        let schema = XyzCsvSchema::detect_from_file(&path)?;
        Self::read_table_with_schema(path, &schema)
    }

    /// Read points and optional labels with a specific schema
    pub fn read_table_with_schema<P: AsRef<Path>>(path: P, schema: &XyzCsvSchema) -> Result<PointTable> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let indices = schema.coordinate_indices()?;
        let label_index = schema.index_of(ColumnType::Label);

        let mut cloud = PointCloud::new();
        let mut labels = label_index.map(|_| Vec::new());
        let mut header_pending = schema.has_header;

        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            if header_pending {
                header_pending = false;
                continue;
            }

            let line_number = line_idx + 1;
            let parts = schema.delimiter.split(&line);
            cloud.push(Self::parse_point(&parts, indices, line_number)?);

            if let (Some(labels), Some(idx)) = (labels.as_mut(), label_index) {
                labels.push(Self::parse_label(&parts, idx, line_number)?);
            }
        }

        Ok(PointTable { cloud, labels })
    }

    fn parse_point(parts: &[&str], indices: [usize; 3], line_number: usize) -> Result<Point3d> {
        let mut coords = [0.0f64; 3];
        for (axis, (&idx, coord)) in indices.iter().zip(coords.iter_mut()).enumerate() {
            let name = ["x", "y", "z"][axis];
            let field = parts.get(idx).ok_or_else(|| {
                Error::InvalidData(format!("line {line_number}: missing {name} coordinate"))
            })?;
            let value = field.parse::<f64>().map_err(|_| {
                Error::InvalidData(format!("line {line_number}: invalid {name} coordinate '{field}'"))
            })?;
            if !value.is_finite() {
                return Err(Error::InvalidData(format!(
                    "line {line_number}: non-finite {name} coordinate '{field}'"
                )));
            }
            *coord = value;
        }
        Ok(Point3d::new(coords[0], coords[1], coords[2]))
    }

    fn parse_label(parts: &[&str], idx: usize, line_number: usize) -> Result<WireLabel> {
        let field = parts
            .get(idx)
            .ok_or_else(|| Error::InvalidData(format!("line {line_number}: missing label")))?;

        // Label columns written by float-only tools look like "3.0"
        let code = field.parse::<i64>().ok().or_else(|| {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
                .map(|v| v as i64)
        });

        code.and_then(WireLabel::from_code)
            .ok_or_else(|| Error::InvalidData(format!("line {line_number}: invalid label '{field}'")))
    }
}

/// Write options for XYZ/CSV files
#[derive(Debug, Clone, PartialEq)]
pub struct XyzCsvWriteOptions {
    pub delimiter: Delimiter,
    pub include_header: bool,
}

impl XyzCsvWriteOptions {
    /// Space separated, no header
    pub fn xyz() -> Self {
        Self {
            delimiter: Delimiter::Space,
            include_header: false,
        }
    }

    /// Comma separated with a header line
    pub fn csv_with_header() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            include_header: true,
        }
    }

    /// Options matching a file extension: `.xyz`/`.txt` as XYZ, anything else as CSV
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()).map(str::to_lowercase).as_deref() {
            Some("xyz") | Some("txt") => Self::xyz(),
            _ => Self::csv_with_header(),
        }
    }
}

impl Default for XyzCsvWriteOptions {
    fn default() -> Self {
        Self::csv_with_header()
    }
}

/// XYZ/CSV writer implementation
pub struct XyzCsvWriter;

impl XyzCsvWriter {
    /// Write a point cloud to an XYZ/CSV file
    pub fn write_point_cloud<P: AsRef<Path>>(
        cloud: &PointCloud<Point3d>,
        path: P,
        options: &XyzCsvWriteOptions,
    ) -> Result<()> {
        Self::write_rows(cloud, None, path.as_ref(), options)
    }

    /// Write points with a trailing `wire` column, -1 for noise
    pub fn write_labeled_points<P: AsRef<Path>>(
        cloud: &PointCloud<Point3d>,
        labels: &[WireLabel],
        path: P,
        options: &XyzCsvWriteOptions,
    ) -> Result<()> {
        if labels.len() != cloud.len() {
            return Err(Error::InvalidLabels {
                expected: cloud.len(),
                found: labels.len(),
            });
        }
        Self::write_rows(cloud, Some(labels), path.as_ref(), options)
    }

    fn write_rows(
        cloud: &PointCloud<Point3d>,
        labels: Option<&[WireLabel]>,
        path: &Path,
        options: &XyzCsvWriteOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let sep = options.delimiter.as_char();

        if options.include_header {
            let mut columns = vec![ColumnType::X, ColumnType::Y, ColumnType::Z];
            if labels.is_some() {
                columns.push(ColumnType::Label);
            }
            let header: Vec<&str> = columns.iter().map(|c| c.header_name()).collect();
            writeln!(writer, "{}", header.join(&sep.to_string()))?;
        }

        for (idx, point) in cloud.iter().enumerate() {
            write!(writer, "{}{sep}{}{sep}{}", point.x, point.y, point.z)?;
            if let Some(labels) = labels {
                write!(writer, "{sep}{}", labels[idx].to_code())?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wirecrate_xyz_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(Delimiter::detect_from_line("1,2,3"), Some(Delimiter::Comma));
        assert_eq!(Delimiter::detect_from_line("1 2 3"), Some(Delimiter::Space));
        assert_eq!(Delimiter::detect_from_line("1\t2\t3"), Some(Delimiter::Tab));
        assert_eq!(Delimiter::detect_from_line("1;2;3"), Some(Delimiter::Semicolon));
        assert_eq!(Delimiter::detect_from_line("x, y, z"), Some(Delimiter::Comma));
        assert_eq!(Delimiter::detect_from_line("123"), None);
    }

    #[test]
    fn test_column_type_detection() {
        assert_eq!(ColumnType::from_header("x"), ColumnType::X);
        assert_eq!(ColumnType::from_header(" Y "), ColumnType::Y);
        assert_eq!(ColumnType::from_header("position_z"), ColumnType::Z);
        assert_eq!(ColumnType::from_header("cluster"), ColumnType::Label);
        assert_eq!(ColumnType::from_header("Wire"), ColumnType::Label);
        assert_eq!(ColumnType::from_header("intensity"), ColumnType::Unknown);
    }

    #[test]
    fn test_xyz_reader_basic() {
        let path = temp_path("basic.xyz");
        fs::write(&path, "1.0 2.0 3.0\n4.0  5.0  6.0\n\n7.0 8.0 9.0 0.5\n").unwrap();

        let cloud = XyzCsvReader::read_point_cloud(&path).unwrap();
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud[0], Point3d::new(1.0, 2.0, 3.0));
        assert_eq!(cloud[1], Point3d::new(4.0, 5.0, 6.0));
        assert_eq!(cloud[2], Point3d::new(7.0, 8.0, 9.0));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_csv_reader_with_labels() {
        let path = temp_path("labels.csv");
        fs::write(&path, "x,y,z,cluster\n1.0,2.0,3.0,0\n4.0,5.0,6.0,-1\n7.0,8.0,9.0,2.0\n").unwrap();

        let table = XyzCsvReader::read_table(&path).unwrap();
        assert_eq!(table.cloud.len(), 3);
        assert_eq!(
            table.labels,
            Some(vec![WireLabel::Wire(0), WireLabel::Noise, WireLabel::Wire(2)])
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_reordered_columns_with_semicolons() {
        let path = temp_path("reordered.csv");
        fs::write(&path, "intensity;z;x;y\n0.5;3.0;1.0;2.0\n").unwrap();

        let table = XyzCsvReader::read_table(&path).unwrap();
        assert_eq!(table.cloud[0], Point3d::new(1.0, 2.0, 3.0));
        assert!(table.labels.is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_schema_detection() {
        let schema = XyzCsvSchema::detect_from_line("x\ty\tz\twire").unwrap();
        assert_eq!(schema.delimiter, Delimiter::Tab);
        assert!(schema.has_header);
        assert!(schema.has_labels());
        assert_eq!(schema.index_of(ColumnType::Z), Some(2));

        let headerless = XyzCsvSchema::detect_from_line("1 2 3 4").unwrap();
        assert!(!headerless.has_header);
        assert_eq!(headerless.columns.len(), 4);
        assert!(!headerless.has_labels());
    }

    #[test]
    fn test_header_without_z_is_rejected() {
        assert!(matches!(
            XyzCsvSchema::detect_from_line("x,y,intensity"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_error_reports_line_number() {
        let path = temp_path("bad_value.csv");
        fs::write(&path, "x,y,z\n1,2,3\n4,abc,6\n").unwrap();

        match XyzCsvReader::read_point_cloud(&path) {
            Err(Error::InvalidData(msg)) => {
                assert!(msg.contains("line 3"), "{msg}");
                assert!(msg.contains("abc"), "{msg}");
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_column_and_bad_label() {
        let short = temp_path("short.xyz");
        fs::write(&short, "1.0 2.0 3.0\n1.0 2.0\n").unwrap();
        assert!(XyzCsvReader::read_point_cloud(&short).is_err());
        let _ = fs::remove_file(&short);

        let bad_label = temp_path("bad_label.csv");
        fs::write(&bad_label, "x,y,z,label\n1,2,3,wire-a\n").unwrap();
        assert!(matches!(XyzCsvReader::read_table(&bad_label), Err(Error::InvalidData(_))));
        let _ = fs::remove_file(&bad_label);
    }

    #[test]
    fn test_non_finite_and_empty_files() {
        let nan = temp_path("nan.csv");
        fs::write(&nan, "x,y,z\n1,NaN,3\n").unwrap();
        assert!(matches!(XyzCsvReader::read_point_cloud(&nan), Err(Error::InvalidData(_))));
        let _ = fs::remove_file(&nan);

        let empty = temp_path("empty.csv");
        fs::write(&empty, "\n\n").unwrap();
        assert!(matches!(XyzCsvReader::read_point_cloud(&empty), Err(Error::InvalidData(_))));
        let _ = fs::remove_file(&empty);
    }

    #[test]
    fn test_labeled_writer_output_reads_back() {
        let path = temp_path("written.csv");
        let cloud = PointCloud::from_points(vec![
            Point3d::new(1.5, -2.0, 3.25),
            Point3d::new(0.1, 0.2, 0.3),
        ]);
        let labels = vec![WireLabel::Wire(4), WireLabel::Noise];

        XyzCsvWriter::write_labeled_points(&cloud, &labels, &path, &XyzCsvWriteOptions::default()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("x,y,z,wire\n"));
        assert!(content.contains("1.5,-2,3.25,4"));
        assert!(content.contains("0.1,0.2,0.3,-1"));

        let table = XyzCsvReader::read_table(&path).unwrap();
        assert_eq!(table.cloud, cloud);
        assert_eq!(table.labels, Some(labels));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_xyz_writer_and_label_mismatch() {
        let path = temp_path("written.xyz");
        let cloud = PointCloud::from_points(vec![Point3d::new(1.0, 2.0, 3.0)]);

        XyzCsvWriter::write_point_cloud(&cloud, &path, &XyzCsvWriteOptions::for_path(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 2 3\n");

        let result = XyzCsvWriter::write_labeled_points(&cloud, &[], &path, &XyzCsvWriteOptions::xyz());
        assert!(matches!(result, Err(Error::InvalidLabels { expected: 1, found: 0 })));

        fs::remove_file(&path).unwrap();
    }
}
