//! Serial DAC Backend (skeleton)
//!
//! [`QdacBackend`] targets a rack-mounted multi-channel DAC driven over a
//! serial line (QDAC-style instruments). Implementing the full transport
//! requires:
//!  - opening the serial port with the configured baud rate
//!  - per-channel `set`/`get` command framing and response parsing
//!  - mapping instrument fault responses into [`HardwareError::Io`]
//!
//! This implementation is intentionally partial: it provides the config
//! surface and proper error messages so the transport can be filled in
//! against real hardware without touching any caller.

use serde::{Deserialize, Serialize};

use crate::{ChannelId, HardwareError, HardwareResult, VoltageSource};

/// Serial connection settings for a QDAC-style voltage source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdacConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0`.
    pub port: String,
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Per-command timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for QdacConfig {
    /// Default settings for a locally attached instrument.
    ///
    /// - `port`: "/dev/ttyUSB0"
    /// - `baud_rate`: 460800
    /// - `timeout_ms`: 1000
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 460_800,
            timeout_ms: 1000,
        }
    }
}

/// Minimal QDAC controller skeleton.
///
/// Holds config and placeholder state only. All trait methods return
/// [`HardwareError::NotConnected`] until the serial transport is
/// implemented; the struct exists so production call sites and tests can
/// already be written against the final surface.
#[derive(Debug)]
pub struct QdacBackend {
    pub cfg: QdacConfig,
    // TODO: store serial port handle and per-channel calibration table.
}

impl QdacBackend {
    pub fn new(cfg: QdacConfig) -> Self {
        Self { cfg }
    }

    /// Open the serial port and handshake with the instrument.
    ///
    /// Production steps (outline):
    /// 1. Open `cfg.port` at `cfg.baud_rate`, 8N1.
    /// 2. Send identification query, verify the firmware replies.
    /// 3. Read the channel roster so unknown-channel errors can be raised
    ///    locally instead of round-tripping to the instrument.
    pub fn connect(&mut self) -> HardwareResult<()> {
        Err(HardwareError::NotConnected(format!(
            "QdacBackend::connect(): serial transport not implemented; \
             configured for {} at {} baud",
            self.cfg.port, self.cfg.baud_rate
        )))
    }
}

impl VoltageSource for QdacBackend {
    fn write_channel(&self, channel: &ChannelId, _value: f64) -> HardwareResult<()> {
        Err(HardwareError::NotConnected(format!(
            "QdacBackend::write_channel({}): serial transport not implemented",
            channel
        )))
    }

    fn read_channels(&self, _channels: &[ChannelId]) -> HardwareResult<Vec<f64>> {
        Err(HardwareError::NotConnected(
            "QdacBackend::read_channels(): serial transport not implemented".to_string(),
        ))
    }
}
