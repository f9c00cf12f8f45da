//! Per-point wire labels

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of one separated wire
pub type WireId = u32;

/// Cluster assignment of a single point
///
/// `Noise` sorts before every wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WireLabel {
    /// Point not assigned to any wire
    Noise,
    /// Point belongs to the wire with this id
    Wire(WireId),
}

impl WireLabel {
    /// Integer code used for noise in flat label tables
    pub const NOISE_CODE: i64 = -1;

    /// Wire id, or `None` for noise
    pub fn wire_id(self) -> Option<WireId> {
        match self {
            WireLabel::Noise => None,
            WireLabel::Wire(id) => Some(id),
        }
    }

    pub fn is_noise(self) -> bool {
        matches!(self, WireLabel::Noise)
    }

    /// Flat integer encoding: the wire id, or -1 for noise
    pub fn to_code(self) -> i64 {
        match self {
            WireLabel::Noise => Self::NOISE_CODE,
            WireLabel::Wire(id) => i64::from(id),
        }
    }

    /// Decode the flat integer encoding
    ///
    /// Any negative value is treated as noise. Values above `u32::MAX` are
    /// not representable and return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        if code < 0 {
            Some(WireLabel::Noise)
        } else {
            WireId::try_from(code).ok().map(WireLabel::Wire)
        }
    }
}

impl fmt::Display for WireLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLabel::Noise => write!(f, "noise"),
            WireLabel::Wire(id) => write!(f, "wire {id}"),
        }
    }
}

/// Group point indices by wire id, skipping noise
///
/// Indices within each group keep their input order.
pub fn group_by_wire(labels: &[WireLabel]) -> BTreeMap<WireId, Vec<usize>> {
    let mut groups: BTreeMap<WireId, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        if let WireLabel::Wire(id) = label {
            groups.entry(*id).or_default().push(idx);
        }
    }
    groups
}

/// Number of points labeled as noise
pub fn noise_count(labels: &[WireLabel]) -> usize {
    labels.iter().filter(|l| l.is_noise()).count()
}
