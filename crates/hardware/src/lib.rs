//! # qdot-hardware — Instrument Access Layer
//!
//! Backend-agnostic interface to the voltage sources that drive the gate
//! electrodes of an electrostatically controlled device. The tuning core
//! (`qdot-gates`) talks to hardware exclusively through the [`VoltageSource`]
//! trait defined here and never deals with wire protocols, serial framing, or
//! instrument quirks.
//!
//! ## Backends
//!
//! | Backend | Status | Use |
//! |---------|--------|-----|
//! | [`MockVoltageSource`] | Functional | Unit and integration tests |
//! | [`QdacBackend`](qdac::QdacBackend) | Skeleton | Production serial DAC (to be wired up) |
//!
//! ## Contract
//!
//! - `write_channel()` is blocking: it must not return until the value is
//!   committed to the instrument (or the attempt failed).
//! - `read_channels()` returns one value per requested channel, in request
//!   order. Returning fewer values than requested is a contract violation
//!   that callers surface as [`HardwareError::ShortRead`].
//! - No retries at this layer. A failed write or read is reported once and
//!   propagates to the caller.
//! - Implementations take `&self`; exclusive access to the physical channel
//!   set is the caller's responsibility.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// In-memory mock voltage source for testing.
///
/// Seeded channel table, ordered write log, configurable readback
/// quantization and failure injection. See [`MockVoltageSource`].
pub mod mock;

/// Serial DAC backend skeleton.
///
/// [`QdacBackend`](qdac::QdacBackend) implements [`VoltageSource`] with
/// typed not-connected errors until the serial transport is wired up.
/// Interface parity with the mock backend.
pub mod qdac;

pub use mock::MockVoltageSource;
pub use qdac::{QdacBackend, QdacConfig};

// ════════════════════════════════════════════════════════════════════════════
// CHANNEL IDENTIFIER
// ════════════════════════════════════════════════════════════════════════════

/// Identifier of one physical output channel on a voltage source.
///
/// The string form is instrument-specific (e.g. `"dac/slot0/ch3"` for a
/// rack-mounted DAC). `ChannelId` is treated as opaque by the tuning core:
/// it only matters that the configuration registry and the backend agree on
/// the names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create a channel id from its instrument-specific name.
    pub fn new(name: impl Into<String>) -> Self {
        ChannelId(name.into())
    }

    /// The instrument-specific channel name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        ChannelId(name.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(name: String) -> Self {
        ChannelId(name)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ERRORS
// ════════════════════════════════════════════════════════════════════════════

/// Errors from voltage source operations.
///
/// All variants are fatal for the current operation: the tuning core never
/// catches or retries them, they propagate to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// Communication with the instrument failed during a write or read.
    #[error("io error on channel {channel}: {message}")]
    Io {
        /// Channel the operation was addressed to.
        channel: String,
        /// Backend-specific failure detail.
        message: String,
    },

    /// The backend does not expose a channel with this id.
    #[error("unknown channel: {channel}")]
    UnknownChannel {
        /// The unrecognized channel id.
        channel: String,
    },

    /// A batched read returned fewer values than requested.
    #[error("short read: requested {requested} channels, got {returned} values")]
    ShortRead {
        /// Number of channels requested.
        requested: usize,
        /// Number of values the backend returned.
        returned: usize,
    },

    /// The backend is not connected to its instrument.
    #[error("not connected: {0}")]
    NotConnected(String),
}

/// Result type alias for voltage source operations.
pub type HardwareResult<T> = Result<T, HardwareError>;

// ════════════════════════════════════════════════════════════════════════════
// VOLTAGE SOURCE TRAIT
// ════════════════════════════════════════════════════════════════════════════

/// Blocking interface to a multi-channel voltage source.
///
/// ## Contract
///
/// - `write_channel()` commits one value to one channel and returns only
///   once the instrument has accepted it (or the attempt failed).
/// - `read_channels()` returns the currently realized value of each
///   requested channel, one per channel, in request order. The realized
///   value may differ from the last written value by quantization or
///   settling error; callers that need ground truth must read back.
/// - All methods return [`HardwareResult`] — no panics.
/// - Implementations must be `Send + Sync`; serialization of concurrent
///   access to the physical channels is the caller's concern.
pub trait VoltageSource: Send + Sync {
    /// Write `value` (in volts) to `channel`.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::Io`] — communication failure.
    /// - [`HardwareError::UnknownChannel`] — no such channel on this source.
    /// - [`HardwareError::NotConnected`] — backend has no live connection.
    fn write_channel(&self, channel: &ChannelId, value: f64) -> HardwareResult<()>;

    /// Read the realized value of each channel in `channels`, in order.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::Io`] — communication failure.
    /// - [`HardwareError::UnknownChannel`] — a requested channel does not
    ///   exist on this source.
    /// - [`HardwareError::NotConnected`] — backend has no live connection.
    fn read_channels(&self, channels: &[ChannelId]) -> HardwareResult<Vec<f64>>;
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
