//! Gate-Space Types and Constants
//!
//! The tuned gate set, the wider rollback set, the default safety tolerance,
//! and the data carriers produced by the deviation checker.
//!
//! Gate indices are 1-based everywhere they are user-visible (logs, errors,
//! reports); slices and channel mappings are 0-based as usual.

use serde::Serialize;

// ════════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ════════════════════════════════════════════════════════════════════════════

/// Number of gates that participate in the tolerance check and the commit.
pub const TUNED_GATES: usize = 6;

/// Number of channels forced back to the pretuned point on rollback.
///
/// Wider than [`TUNED_GATES`]: the rollback set covers two guard channels
/// that are never tuned but must be pinned to known-safe values whenever the
/// device is returned to the pretuned point. Channel mappings and reference
/// points must cover the full rollback set.
pub const ROLLBACK_GATES: usize = 8;

/// Maximum allowed per-gate deviation from the pretuned point, in volts.
pub const DEFAULT_TOLERANCE: f64 = 5e-3;

// ════════════════════════════════════════════════════════════════════════════
// DEVIATION CARRIERS
// ════════════════════════════════════════════════════════════════════════════

/// First gate found outside the tolerance band.
///
/// Produced by [`first_violation`](crate::checker::first_violation); carried
/// into [`GateError::SafetyViolation`](crate::error::GateError) unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Violation {
    /// 1-based gate index.
    pub gate: usize,
    /// Pretuned-point value of this gate, in volts.
    pub reference: f64,
    /// Requested target value, in volts.
    pub requested: f64,
    /// `|reference - requested|`, in volts.
    pub deviation: f64,
    /// Tolerance that was in force, in volts.
    pub tolerance: f64,
}

/// Per-gate deviation entry of a [`DeviationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateDeviation {
    /// 1-based gate index.
    pub gate: usize,
    /// Pretuned-point value, in volts.
    pub reference: f64,
    /// Requested target value, in volts.
    pub requested: f64,
    /// `|reference - requested|`, in volts.
    pub deviation: f64,
    /// Whether this gate exceeds the tolerance.
    pub exceeds: bool,
}

/// Full per-gate deviation picture for a requested target point.
///
/// Read-only preview for callers that want to show an operator what a
/// commit would do before invoking it. Computing a report touches no
/// hardware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationReport {
    /// Tolerance the entries were judged against, in volts.
    pub tolerance: f64,
    /// One entry per tuned gate, in gate order.
    pub gates: Vec<GateDeviation>,
}

impl DeviationReport {
    /// True when no gate exceeds the tolerance.
    pub fn is_safe(&self) -> bool {
        self.gates.iter().all(|g| !g.exceeds)
    }

    /// The entry with the largest deviation, if any gates were checked.
    pub fn worst(&self) -> Option<&GateDeviation> {
        self.gates
            .iter()
            .max_by(|a, b| a.deviation.total_cmp(&b.deviation))
    }
}
