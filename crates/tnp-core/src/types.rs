//! Shared output-record types.

use serde::{Deserialize, Serialize};

/// Reported kinematics of one object, or of a composed pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Transverse momentum (GeV).
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth (radians).
    pub phi: f64,
    /// Invariant mass (GeV).
    pub mass: f64,
}

/// Per-event reduced record: one resolved tag/probe pair.
///
/// Events that do not resolve to a pair produce no record at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRecord {
    /// Identity of the source event (the `event` branch if present,
    /// otherwise the running event index).
    pub event: u64,
    /// Tag kinematics.
    pub tag: Kinematics,
    /// Tag charge.
    pub tag_charge: i32,
    /// Probe kinematics.
    pub probe: Kinematics,
    /// Probe charge.
    pub probe_charge: i32,
    /// Composed tag+probe kinematics.
    pub pair: Kinematics,
    /// Monte-Carlo truth label (always true for data).
    pub mc_truth: bool,
    /// Per-working-point pass flags evaluated on the probe, in
    /// configuration order.
    pub working_points: Vec<(String, bool)>,
    /// Event weight, when a weight expression is configured.
    pub weight: Option<f64>,
}

impl PairRecord {
    /// Look up a working-point flag by name.
    pub fn passing(&self, name: &str) -> Option<bool> {
        self.working_points.iter().find(|(n, _)| n == name).map(|(_, p)| *p)
    }
}
