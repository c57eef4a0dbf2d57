//! Gate Tuning Error Types
//!
//! Two fatal error families cross the public surface:
//!
//! - [`GateError::SafetyViolation`] — expected-fatal. The requested point was
//!   more than the tolerance away from the pretuned point; the rollback
//!   channel set has been restored to the pretuned point before this error
//!   is returned. Callers must not assume any target value was applied.
//! - [`GateError::Hardware`] — unexpected-fatal. A write or read failed at
//!   the instrument boundary. Never caught or retried here; a mid-commit
//!   failure leaves the device in a mixed state (no atomicity across the
//!   commit writes).
//!
//! The remaining variants reject malformed input before any hardware
//! interaction. All errors are values with unwind-to-caller semantics;
//! nothing in this crate terminates the process.

use thiserror::Error;

use qdot_hardware::HardwareError;

use crate::types::Violation;

/// Result type alias for gate tuning operations.
pub type GateResult<T> = Result<T, GateError>;

/// Errors from the safety-gated gate commit and its configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// The requested point deviates from the pretuned point by more than
    /// the tolerance. Raised only after the rollback channel set has been
    /// forced back to the pretuned point.
    #[error(
        "emergency: gate {gate} requested {requested} V against reference {reference} V, \
         deviation {deviation} V exceeds the {tolerance} V tolerance; \
         rollback channels were returned to the pretuned point"
    )]
    SafetyViolation {
        /// 1-based index of the first offending gate.
        gate: usize,
        /// Pretuned-point value of that gate, in volts.
        reference: f64,
        /// Requested target value, in volts.
        requested: f64,
        /// Absolute deviation, in volts.
        deviation: f64,
        /// Tolerance that was in force, in volts.
        tolerance: f64,
    },

    /// Write or read failure at the instrument boundary.
    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The target point does not have one value per tuned gate.
    #[error("target point has {got} values, expected exactly {expected}")]
    TargetLength {
        /// Required number of values.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Channel mapping does not cover the rollback set.
    #[error("channel mapping has {got} channels, rollback requires at least {required}")]
    MappingTooShort {
        /// Minimum number of channels.
        required: usize,
        /// Number configured.
        got: usize,
    },

    /// Reference point does not cover the rollback set.
    #[error("reference point has {got} values, rollback requires at least {required}")]
    ReferenceTooShort {
        /// Minimum number of values.
        required: usize,
        /// Number configured.
        got: usize,
    },

    /// Channel mapping and reference point disagree in length.
    #[error("channel mapping has {channels} entries but reference point has {reference}")]
    LengthMismatch {
        /// Configured channel count.
        channels: usize,
        /// Configured reference value count.
        reference: usize,
    },

    /// The same physical channel appears twice in the mapping.
    #[error("channel {channel} appears more than once in the mapping")]
    DuplicateChannel {
        /// The repeated channel id.
        channel: String,
    },

    /// Tolerance is not a finite positive voltage.
    #[error("tolerance {tolerance} is not a finite positive voltage")]
    InvalidTolerance {
        /// The rejected value.
        tolerance: f64,
    },

    /// A configuration file could not be read.
    #[error("failed to read config {path}: {message}")]
    ConfigRead {
        /// Path that was attempted.
        path: String,
        /// Underlying io detail.
        message: String,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {message}")]
    ConfigParse {
        /// Parser detail.
        message: String,
    },
}

impl From<Violation> for GateError {
    fn from(v: Violation) -> Self {
        GateError::SafetyViolation {
            gate: v.gate,
            reference: v.reference,
            requested: v.requested,
            deviation: v.deviation,
            tolerance: v.tolerance,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_violation_display_names_emergency() {
        let err = GateError::SafetyViolation {
            gate: 2,
            reference: 0.0,
            requested: 0.01,
            deviation: 0.01,
            tolerance: 0.005,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("emergency"));
        assert!(msg.contains("gate 2"));
        assert!(msg.contains("pretuned point"));
        assert!(msg.contains("0.005"));
    }

    #[test]
    fn test_violation_converts_losslessly() {
        let violation = Violation {
            gate: 4,
            reference: -0.2,
            requested: -0.25,
            deviation: 0.05,
            tolerance: 0.005,
        };
        match GateError::from(violation) {
            GateError::SafetyViolation {
                gate,
                reference,
                requested,
                deviation,
                tolerance,
            } => {
                assert_eq!(gate, 4);
                assert_eq!(reference, -0.2);
                assert_eq!(requested, -0.25);
                assert_eq!(deviation, 0.05);
                assert_eq!(tolerance, 0.005);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_hardware_error_wraps_with_source() {
        use std::error::Error;

        let hw = HardwareError::Io {
            channel: "dac/a".to_string(),
            message: "timeout".to_string(),
        };
        let err: GateError = hw.into();
        assert!(matches!(err, GateError::Hardware(_)));
        assert!(err.source().is_some());
        assert!(format!("{}", err).contains("dac/a"));
    }

    #[test]
    fn test_target_length_display() {
        let err = GateError::TargetLength {
            expected: 6,
            got: 4,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("6"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<GateError>();
    }
}
