//! Safety-Gated Gate Commit
//!
//! [`GateController`] owns the validate-then-commit-then-verify sequence
//! around a [`VoltageSource`]:
//!
//! ```text
//! START → CHECKING ──(any |diff| > tolerance)──► UNSAFE_ROLLBACK (fatal)
//!             │
//!             └──(all |diff| ≤ tolerance)──► COMMITTING → READING → DONE
//! ```
//!
//! - **CHECKING** compares the requested point against the pretuned point,
//!   gate by gate, via the pure [`checker`](crate::checker) functions.
//! - **UNSAFE_ROLLBACK** forces the full rollback channel set back to the
//!   pretuned point, then returns [`GateError::SafetyViolation`]. No target
//!   value is ever written on this path.
//! - **COMMITTING** writes the six target values in gate order. Ordering is
//!   contractual: settling behavior can be order dependent on some devices.
//! - **READING** performs one batched readback of the tuned channels. The
//!   returned values are ground truth (DACs quantize, outputs settle) and
//!   callers must carry them forward instead of the requested point.
//!
//! No retries at this layer. A hardware failure propagates immediately; if
//! it happens mid-commit the device is left in a mixed state (there is no
//! atomicity across the commit writes and no automatic recovery on that
//! path, unlike the explicit safety rollback).
//!
//! Exclusive access to the channel set during a call is the caller's
//! responsibility; the controller adds no locking of its own.

use tracing::{debug, error, info, warn};

use qdot_hardware::{HardwareError, VoltageSource};

use crate::checker;
use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::types::{DeviationReport, ROLLBACK_GATES, TUNED_GATES};

/// Safety-gated commit of gate voltages against a pretuned point.
///
/// Borrows its [`VoltageSource`] so one backend can serve several
/// controllers (different devices on one rack DAC). The config is validated
/// at construction; a controller in hand always has a usable mapping.
pub struct GateController<'a, S: VoltageSource + ?Sized> {
    source: &'a S,
    config: GateConfig,
}

impl<'a, S: VoltageSource + ?Sized> GateController<'a, S> {
    /// Build a controller over `source` with a validated `config`.
    ///
    /// # Errors
    ///
    /// Any [`GateConfig::validate`] rejection.
    pub fn new(source: &'a S, config: GateConfig) -> GateResult<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// The validated configuration in force.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Apply `target` to the tuned gates if it is within tolerance of the
    /// pretuned point; read back and return the realized voltages.
    ///
    /// The safety invariant: no channel is written with a target value
    /// unless **every** tuned gate is within tolerance. On violation the
    /// full rollback set (channels 1..=8) is forced back to the pretuned
    /// point and [`GateError::SafetyViolation`] is returned.
    ///
    /// # Arguments
    ///
    /// * `target` — requested voltages, exactly one per tuned gate.
    ///
    /// # Returns
    ///
    /// The realized voltages of the tuned gates after the commit, from one
    /// batched readback. Treat these, not `target`, as ground truth.
    ///
    /// # Errors
    ///
    /// - [`GateError::TargetLength`] — `target` is not exactly
    ///   [`TUNED_GATES`] values; raised before any hardware call.
    /// - [`GateError::SafetyViolation`] — deviation above tolerance;
    ///   rollback completed first.
    /// - [`GateError::Hardware`] — instrument failure, propagated
    ///   immediately with no retry. During a commit this can leave a mixed
    ///   state; during a rollback it preempts the safety error (the
    ///   violation is still logged before the first rollback write).
    pub fn set_gates_checked(&self, target: &[f64]) -> GateResult<Vec<f64>> {
        if target.len() != TUNED_GATES {
            return Err(GateError::TargetLength {
                expected: TUNED_GATES,
                got: target.len(),
            });
        }

        let reference = &self.config.reference_point;

        if let Some(violation) =
            checker::first_violation(&reference[..TUNED_GATES], target, self.config.tolerance)
        {
            error!(
                "gate {} requested {} V against reference {} V ({} V deviation, tolerance {} V); \
                 forcing rollback channels back to the pretuned point",
                violation.gate,
                violation.requested,
                violation.reference,
                violation.deviation,
                violation.tolerance
            );
            self.rollback()?;
            return Err(violation.into());
        }

        // Commit in gate order, one blocking write per gate.
        for (i, &value) in target.iter().enumerate() {
            debug!("commit gate {}: {} <- {} V", i + 1, self.config.channels[i], value);
            self.source.write_channel(&self.config.channels[i], value)?;
        }

        let actual = self.read_tuned()?;
        info!(
            "committed {} gates, readback {:?}",
            TUNED_GATES, actual
        );
        Ok(actual)
    }

    /// Per-gate deviation preview for `target`, without touching hardware.
    ///
    /// Intended for caller-side confirmation: show the report to an
    /// operator, then call [`set_gates_checked`](Self::set_gates_checked).
    /// The report and the commit judge against the same tolerance.
    ///
    /// # Errors
    ///
    /// [`GateError::TargetLength`] — `target` is not exactly
    /// [`TUNED_GATES`] values.
    pub fn deviation_report(&self, target: &[f64]) -> GateResult<DeviationReport> {
        if target.len() != TUNED_GATES {
            return Err(GateError::TargetLength {
                expected: TUNED_GATES,
                got: target.len(),
            });
        }
        Ok(checker::deviation_report(
            &self.config.reference_point[..TUNED_GATES],
            target,
            self.config.tolerance,
        ))
    }

    /// Read the realized voltages of the tuned gates without writing.
    ///
    /// # Errors
    ///
    /// [`GateError::Hardware`] — instrument failure on the batched read.
    pub fn read_current(&self) -> GateResult<Vec<f64>> {
        self.read_tuned()
    }

    /// Force the rollback channel set back to the pretuned point.
    ///
    /// Writes reference values to channels 1..=[`ROLLBACK_GATES`] in order.
    /// A write failure propagates with `?`, abandoning the remaining
    /// rollback writes.
    fn rollback(&self) -> GateResult<()> {
        warn!(
            "restoring {} rollback channels to the pretuned point",
            ROLLBACK_GATES
        );
        for i in 0..ROLLBACK_GATES {
            let value = self.config.reference_point[i];
            debug!("rollback gate {}: {} <- {} V", i + 1, self.config.channels[i], value);
            self.source.write_channel(&self.config.channels[i], value)?;
        }
        Ok(())
    }

    /// One batched read of the tuned channels, guarded against short reads.
    fn read_tuned(&self) -> GateResult<Vec<f64>> {
        let requested = &self.config.channels[..TUNED_GATES];
        let mut values = self.source.read_channels(requested)?;
        if values.len() < TUNED_GATES {
            return Err(GateError::Hardware(HardwareError::ShortRead {
                requested: TUNED_GATES,
                returned: values.len(),
            }));
        }
        values.truncate(TUNED_GATES);
        Ok(values)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
