//! Mock Voltage Source for Testing
//!
//! Fully in-memory implementation of [`VoltageSource`]. No instrument, no
//! serial port, no timing. Used by the unit and integration tests of the
//! tuning core.
//!
//! # Features
//!
//! - Seeded channel table: only seeded channels exist, writes to anything
//!   else fail with [`HardwareError::UnknownChannel`]
//! - Ordered write log for asserting write sequences
//! - Optional readback quantization, simulating the DAC LSB so that the
//!   realized value differs from the requested one
//! - Deterministic failure injection: fail writes to one named channel, or
//!   fail every read
//!
//! # Example
//!
//! ```ignore
//! use qdot_hardware::{ChannelId, MockVoltageSource, VoltageSource};
//!
//! let mock = MockVoltageSource::new()
//!     .with_channel(ChannelId::new("dac/a"), 0.0)
//!     .with_quantization(1e-4);
//! mock.write_channel(&ChannelId::new("dac/a"), 0.12342).unwrap();
//! let v = mock.read_channels(&[ChannelId::new("dac/a")]).unwrap();
//! assert!((v[0] - 0.1234).abs() < 1e-12); // snapped to the quantization grid
//! ```

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::{ChannelId, HardwareError, HardwareResult, VoltageSource};

// ════════════════════════════════════════════════════════════════════════════
// MOCK VOLTAGE SOURCE
// ════════════════════════════════════════════════════════════════════════════

/// In-memory voltage source for tests.
///
/// Behavior knobs (`quantization`, `fail_writes_to`, `fail_reads`) are fixed
/// at construction; the channel table and write log sit behind locks so the
/// mock can be driven through `&self` like any production backend.
pub struct MockVoltageSource {
    /// Channel table: id -> last written value.
    channels: RwLock<HashMap<ChannelId, f64>>,
    /// Every accepted write, in call order.
    writes: Mutex<Vec<(ChannelId, f64)>>,
    /// Readback grid step in volts. `None` reads back exactly what was written.
    quantization: Option<f64>,
    /// Writes addressed to this channel fail with an io error.
    fail_writes_to: Option<ChannelId>,
    /// Every `read_channels()` call fails with an io error.
    fail_reads: bool,
}

impl std::fmt::Debug for MockVoltageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockVoltageSource")
            .field("channel_count", &self.channels.read().len())
            .field("write_count", &self.writes.lock().len())
            .field("quantization", &self.quantization)
            .field("fail_writes_to", &self.fail_writes_to)
            .field("fail_reads", &self.fail_reads)
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CONSTRUCTORS & BUILDERS
// ════════════════════════════════════════════════════════════════════════════

impl MockVoltageSource {
    /// Create an empty mock with no channels and no failure injection.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            quantization: None,
            fail_writes_to: None,
            fail_reads: false,
        }
    }

    /// Seed one channel with an initial value. Builder-style.
    pub fn with_channel(self, channel: ChannelId, value: f64) -> Self {
        self.channels.write().insert(channel, value);
        self
    }

    /// Seed channels from (id, value) pairs. Builder-style.
    pub fn with_channels<I>(self, channels: I) -> Self
    where
        I: IntoIterator<Item = (ChannelId, f64)>,
    {
        {
            let mut table = self.channels.write();
            for (channel, value) in channels {
                table.insert(channel, value);
            }
        }
        self
    }

    /// Snap readback values to a voltage grid of `step` volts.
    ///
    /// Simulates DAC resolution: `read_channels()` returns
    /// `(value / step).round() * step` instead of the exact written value.
    pub fn with_quantization(mut self, step: f64) -> Self {
        self.quantization = Some(step);
        self
    }

    /// Make every write to `channel` fail with [`HardwareError::Io`].
    pub fn with_write_failure(mut self, channel: ChannelId) -> Self {
        self.fail_writes_to = Some(channel);
        self
    }

    /// Make every `read_channels()` call fail with [`HardwareError::Io`].
    pub fn with_read_failure(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    // ────────────────────────────────────────────────────────────────────────
    // TEST HELPERS
    // ────────────────────────────────────────────────────────────────────────

    /// All accepted writes in call order, as (channel, value) pairs.
    pub fn writes(&self) -> Vec<(ChannelId, f64)> {
        self.writes.lock().clone()
    }

    /// Clear the write log (channel values stay).
    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }

    /// Current stored value of `channel`, if it exists.
    pub fn value(&self, channel: &ChannelId) -> Option<f64> {
        self.channels.read().get(channel).copied()
    }

    fn quantize(&self, value: f64) -> f64 {
        match self.quantization {
            Some(step) => (value / step).round() * step,
            None => value,
        }
    }
}

impl Default for MockVoltageSource {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VOLTAGE SOURCE IMPL
// ════════════════════════════════════════════════════════════════════════════

impl VoltageSource for MockVoltageSource {
    fn write_channel(&self, channel: &ChannelId, value: f64) -> HardwareResult<()> {
        if let Some(failing) = &self.fail_writes_to {
            if failing == channel {
                warn!("MockVoltageSource: injected write failure on {}", channel);
                return Err(HardwareError::Io {
                    channel: channel.to_string(),
                    message: "injected write failure".to_string(),
                });
            }
        }

        let mut table = self.channels.write();
        match table.get_mut(channel) {
            Some(slot) => {
                *slot = value;
                self.writes.lock().push((channel.clone(), value));
                debug!("MockVoltageSource: {} <- {} V", channel, value);
                Ok(())
            }
            None => Err(HardwareError::UnknownChannel {
                channel: channel.to_string(),
            }),
        }
    }

    fn read_channels(&self, channels: &[ChannelId]) -> HardwareResult<Vec<f64>> {
        if self.fail_reads {
            warn!("MockVoltageSource: injected read failure");
            return Err(HardwareError::Io {
                channel: channels
                    .first()
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                message: "injected read failure".to_string(),
            });
        }

        let table = self.channels.read();
        let mut values = Vec::with_capacity(channels.len());
        for channel in channels {
            match table.get(channel) {
                Some(value) => values.push(self.quantize(*value)),
                None => {
                    return Err(HardwareError::UnknownChannel {
                        channel: channel.to_string(),
                    })
                }
            }
        }
        Ok(values)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
