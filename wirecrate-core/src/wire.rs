//! Fitted wire results

use crate::catenary::CatenaryParams;
use crate::error::Error;
use crate::label::WireId;
use crate::point::{Point2d, Point3d};
use crate::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One wire whose catenary fit succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedWire {
    /// Wire id assigned by the separator
    pub id: WireId,
    /// Catenary parameters in the wire's own projection plane
    pub params: CatenaryParams,
    /// Sampled curve in the original 3D frame
    pub curve: Vec<Point3d>,
    /// The same samples in the wire's projection plane, x non-decreasing
    pub profile: Vec<Point2d>,
    /// Original points of this wire
    pub points: PointCloud<Point3d>,
    /// Root mean squared residual of the planar fit
    pub rmse: f64,
    /// Solver iterations used
    pub iterations: usize,
}

impl FittedWire {
    /// Number of curve samples
    pub fn sample_count(&self) -> usize {
        self.curve.len()
    }

    /// Polyline length of the sampled 3D curve
    pub fn curve_length(&self) -> f64 {
        self.curve
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }
}

/// A wire that was left out of the result, with the reason
#[derive(Debug)]
pub struct SkippedWire {
    pub id: WireId,
    pub error: Error,
}

/// Partial-success result of fitting every wire group
#[derive(Debug, Default)]
pub struct WireFitReport {
    /// Successfully fitted wires keyed by id
    pub wires: BTreeMap<WireId, FittedWire>,
    /// Groups that could not be fitted, in ascending id order
    pub skipped: Vec<SkippedWire>,
}

impl WireFitReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fitted wires
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn get(&self, id: WireId) -> Option<&FittedWire> {
        self.wires.get(&id)
    }

    /// Ids of the skipped groups
    pub fn skipped_ids(&self) -> Vec<WireId> {
        self.skipped.iter().map(|s| s.id).collect()
    }

    /// Record the outcome of one group's fit
    pub fn record(&mut self, id: WireId, outcome: crate::Result<FittedWire>) {
        match outcome {
            Ok(wire) => {
                self.wires.insert(id, wire);
            }
            Err(error) => self.skipped.push(SkippedWire { id, error }),
        }
    }
}
