//! Deviation Checker
//!
//! Pure functions comparing a requested target point against the pretuned
//! point. No side effects, no hardware access, deterministic: testable with
//! fixture slices alone.
//!
//! The safety verdict is per-gate: a target is unsafe as soon as any single
//! gate deviates from its reference by strictly more than the tolerance.
//! A deviation of exactly the tolerance is safe.

use crate::types::{DeviationReport, GateDeviation, Violation};

/// Find the first gate whose target deviates from the reference by more
/// than `tolerance`.
///
/// Scans in gate order and stops at the first violation; the global verdict
/// is the same whether or not later gates also violate.
///
/// # Arguments
///
/// * `reference` — pretuned-point values; must cover at least
///   `target.len()` gates.
/// * `target` — requested values for the tuned gates.
/// * `tolerance` — maximum allowed absolute deviation, in volts.
///
/// # Returns
///
/// `None` when every checked gate is within tolerance, otherwise the first
/// offending gate as a [`Violation`] (1-based index).
pub fn first_violation(reference: &[f64], target: &[f64], tolerance: f64) -> Option<Violation> {
    debug_assert!(reference.len() >= target.len());

    for (i, (&requested, &reference_value)) in target.iter().zip(reference).enumerate() {
        let deviation = (reference_value - requested).abs();
        if deviation > tolerance {
            return Some(Violation {
                gate: i + 1,
                reference: reference_value,
                requested,
                deviation,
                tolerance,
            });
        }
    }
    None
}

/// Compute the full per-gate deviation picture for `target`.
///
/// Unlike [`first_violation`] this never short-circuits: every tuned gate
/// gets an entry, so callers can present the whole situation to an operator
/// before deciding to commit. Same preconditions as [`first_violation`].
pub fn deviation_report(reference: &[f64], target: &[f64], tolerance: f64) -> DeviationReport {
    debug_assert!(reference.len() >= target.len());

    let gates = target
        .iter()
        .zip(reference)
        .enumerate()
        .map(|(i, (&requested, &reference_value))| {
            let deviation = (reference_value - requested).abs();
            GateDeviation {
                gate: i + 1,
                reference: reference_value,
                requested,
                deviation,
                exceeds: deviation > tolerance,
            }
        })
        .collect();

    DeviationReport { tolerance, gates }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_TOLERANCE;

    const REFERENCE: [f64; 8] = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.1, -0.1];

    // ────────────────────────────────────────────────────────────────────────
    // FIRST VIOLATION
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_identical_points_are_safe() {
        let target = [0.0; 6];
        assert!(first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_small_step_is_safe() {
        let target = [0.001, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_deviation_of_exactly_tolerance_is_safe() {
        let target = [DEFAULT_TOLERANCE, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).is_none());
    }

    #[test]
    fn test_deviation_just_over_tolerance_is_unsafe() {
        let target = [DEFAULT_TOLERANCE + 1e-6, 0.0, 0.0, 0.0, 0.0, 0.0];
        let violation = first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(violation.gate, 1);
        assert!(violation.deviation > DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_negative_deviation_counts() {
        let target = [0.0, 0.0, -0.02, 0.0, 0.0, 0.0];
        let violation = first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(violation.gate, 3);
        assert!((violation.deviation - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_first_of_multiple_violations_reported() {
        let target = [0.0, 0.05, 0.0, 0.09, 0.0, 0.0];
        let violation = first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(violation.gate, 2);
    }

    #[test]
    fn test_violation_carries_context() {
        let target = [0.0, 0.0, 0.0, 0.0, 0.0, 0.03];
        let violation = first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(violation.gate, 6);
        assert_eq!(violation.reference, 0.0);
        assert_eq!(violation.requested, 0.03);
        assert_eq!(violation.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_reference_beyond_tuned_gates_ignored() {
        // Gates 7 and 8 of REFERENCE sit at -0.1 but are never checked.
        let target = [0.0; 6];
        assert!(first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).is_none());
    }

    // ────────────────────────────────────────────────────────────────────────
    // DEVIATION REPORT
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_report_covers_every_gate() {
        let target = [0.001, 0.0, 0.02, 0.0, 0.0, 0.0];
        let report = deviation_report(&REFERENCE, &target, DEFAULT_TOLERANCE);

        assert_eq!(report.gates.len(), 6);
        assert_eq!(report.gates[0].gate, 1);
        assert_eq!(report.gates[5].gate, 6);
        assert!(!report.gates[0].exceeds);
        assert!(report.gates[2].exceeds);
        assert!(!report.is_safe());
    }

    #[test]
    fn test_report_does_not_short_circuit() {
        // Two violations: both must be flagged, not just the first.
        let target = [0.05, 0.0, 0.0, 0.0, 0.0, 0.09];
        let report = deviation_report(&REFERENCE, &target, DEFAULT_TOLERANCE);

        assert!(report.gates[0].exceeds);
        assert!(report.gates[5].exceeds);
        assert_eq!(report.worst().map(|g| g.gate), Some(6));
    }

    #[test]
    fn test_report_agrees_with_first_violation() {
        let target = [0.0, 0.006, 0.0, 0.0, 0.0, 0.0];
        let report = deviation_report(&REFERENCE, &target, DEFAULT_TOLERANCE);
        let violation = first_violation(&REFERENCE, &target, DEFAULT_TOLERANCE).unwrap();

        assert!(!report.is_safe());
        assert_eq!(report.gates[violation.gate - 1].deviation, violation.deviation);
    }
}
