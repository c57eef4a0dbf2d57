//! # qdot-gates — Safety-Gated Gate Voltage Commit
//!
//! Moves the gate electrodes of an electrostatically controlled device to a
//! new voltage point while protecting the device against large single-step
//! jumps from the last known-safe configuration (the "pretuned point").
//! An excessive step on any single gate can damage the device irreversibly,
//! so every commit is gated by a per-gate deviation check.
//!
//! ## Protocol
//!
//! One invocation of [`GateController::set_gates_checked`] runs the full
//! validate-then-commit-then-verify sequence:
//!
//! 1. **Check** — every tuned gate's requested value is compared against
//!    the pretuned point. Any absolute deviation strictly above the
//!    tolerance makes the whole request unsafe.
//! 2. **Rollback (unsafe)** — the full rollback channel set (wider than the
//!    tuned set, see [`ROLLBACK_GATES`]) is forced back to the pretuned
//!    point, then [`GateError::SafetyViolation`] is returned. No target
//!    value reaches the hardware on this path.
//! 3. **Commit + readback (safe)** — the tuned gates are written in gate
//!    order, then read back in one batched read. The readback is the return
//!    value: DAC quantization and settling make the realized point differ
//!    from the requested one, and callers must carry the realized point
//!    forward.
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`types`] | Gate-set constants, [`Violation`], [`DeviationReport`] |
//! | [`checker`] | Pure deviation check and report, no side effects |
//! | [`config`] | [`GateConfig`]: channel mapping, pretuned point, tolerance; toml loading |
//! | [`controller`] | [`GateController`]: rollback and commit-and-readback around a [`VoltageSource`](qdot_hardware::VoltageSource) |
//! | [`error`] | [`GateError`] taxonomy, [`GateResult`] |
//!
//! Hardware access goes exclusively through
//! [`qdot_hardware::VoltageSource`]; tests run against
//! [`qdot_hardware::MockVoltageSource`].
//!
//! ## Concurrency
//!
//! Single-threaded, synchronous, blocking. The controller assumes exclusive
//! access to its channel set for the duration of one call; callers that run
//! concurrent invocations must serialize them externally.

pub mod checker;
pub mod config;
pub mod controller;
pub mod error;
pub mod types;

pub use checker::{deviation_report, first_violation};
pub use config::GateConfig;
pub use controller::GateController;
pub use error::{GateError, GateResult};
pub use types::{
    DeviationReport, GateDeviation, Violation, DEFAULT_TOLERANCE, ROLLBACK_GATES, TUNED_GATES,
};
