//! Gate Configuration
//!
//! The channel mapping and pretuned point for one device, plus the safety
//! tolerance. Always an explicit value passed into the controller, never
//! ambient process state, so the safety check and the rollback path can be
//! exercised with fixture data.
//!
//! ## Config File Format (qdot.toml)
//!
//! ```toml
//! [gates]
//! # Physical channel per logical gate, in gate order. The first 6 are
//! # tuned; all 8 are forced back to the reference point on rollback.
//! channels = [
//!     "dac/slot0/ch0", "dac/slot0/ch1", "dac/slot0/ch2",
//!     "dac/slot0/ch3", "dac/slot0/ch4", "dac/slot0/ch5",
//!     "dac/slot1/ch0", "dac/slot1/ch1",
//! ]
//!
//! # Last known-safe voltages, one per channel above.
//! reference_point = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.1, -0.1]
//!
//! # Optional; defaults to 5e-3 V.
//! tolerance = 5e-3
//! ```
//!
//! ## Loading Priority
//!
//! 1. Explicit path passed to [`GateConfig::load`] → primary
//! 2. `qdot.toml` in the working directory → fallback
//! 3. Typed error: there are no safe hardcoded defaults for a channel
//!    mapping

use std::path::Path;

use serde::{Deserialize, Serialize};

use qdot_hardware::ChannelId;

use crate::error::{GateError, GateResult};
use crate::types::{DEFAULT_TOLERANCE, ROLLBACK_GATES};

// ════════════════════════════════════════════════════════════════════════════
// TOML RAW STRUCT (intermediate for deserialization)
// ════════════════════════════════════════════════════════════════════════════

/// Top-level qdot.toml structure.
/// Only the [gates] section is parsed here; other sections are ignored.
#[derive(Debug, Deserialize)]
struct QdotToml {
    gates: Option<GateConfig>,
}

// ════════════════════════════════════════════════════════════════════════════
// GATE CONFIG
// ════════════════════════════════════════════════════════════════════════════

/// Channel mapping, pretuned point, and tolerance for one device.
///
/// Immutable for the duration of one controller invocation. Construct
/// directly, from a toml string, or from a file; all three paths go through
/// [`GateConfig::validate`] before a controller will accept the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Physical channel per logical gate, in gate order. At least
    /// [`ROLLBACK_GATES`] entries.
    pub channels: Vec<ChannelId>,
    /// Last known-safe voltage per channel, same length as `channels`.
    pub reference_point: Vec<f64>,
    /// Maximum allowed per-gate deviation from the pretuned point, in volts.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl GateConfig {
    /// Build a config with the default tolerance.
    pub fn new(channels: Vec<ChannelId>, reference_point: Vec<f64>) -> Self {
        Self {
            channels,
            reference_point,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Check the config against the rollback and commit requirements.
    ///
    /// ## Validations
    ///
    /// 1. `channels` MUST cover the rollback set ([`ROLLBACK_GATES`]).
    /// 2. `reference_point` MUST cover the rollback set.
    /// 3. `channels` and `reference_point` MUST have the same length.
    /// 4. `tolerance` MUST be a finite voltage greater than 0.
    /// 5. No channel id may appear twice.
    ///
    /// All checks run before any hardware interaction anywhere in this
    /// crate; a controller refuses construction on the first failure.
    pub fn validate(&self) -> GateResult<()> {
        // Validation 1: channel mapping covers the rollback set
        if self.channels.len() < ROLLBACK_GATES {
            return Err(GateError::MappingTooShort {
                required: ROLLBACK_GATES,
                got: self.channels.len(),
            });
        }

        // Validation 2: reference point covers the rollback set
        if self.reference_point.len() < ROLLBACK_GATES {
            return Err(GateError::ReferenceTooShort {
                required: ROLLBACK_GATES,
                got: self.reference_point.len(),
            });
        }

        // Validation 3: mapping and reference agree in length
        if self.channels.len() != self.reference_point.len() {
            return Err(GateError::LengthMismatch {
                channels: self.channels.len(),
                reference: self.reference_point.len(),
            });
        }

        // Validation 4: tolerance is a usable voltage
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(GateError::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }

        // Validation 5: no channel driven from two gate slots
        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].contains(channel) {
                return Err(GateError::DuplicateChannel {
                    channel: channel.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Parse and validate a config from toml text with a `[gates]` section.
    pub fn from_toml_str(text: &str) -> GateResult<GateConfig> {
        let raw: QdotToml = toml::from_str(text).map_err(|e| GateError::ConfigParse {
            message: e.to_string(),
        })?;

        let config = raw.gates.ok_or_else(|| GateError::ConfigParse {
            message: "missing [gates] section".to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    ///
    /// Uses `path` when given, otherwise `qdot.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// - [`GateError::ConfigRead`] — the file could not be read.
    /// - [`GateError::ConfigParse`] — not valid toml, or no `[gates]`
    ///   section.
    /// - Any [`GateConfig::validate`] rejection.
    pub fn load(path: Option<&Path>) -> GateResult<GateConfig> {
        let path = path.unwrap_or_else(|| Path::new("qdot.toml"));

        let text = std::fs::read_to_string(path).map_err(|e| GateError::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_toml_str(&text)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TUNED_GATES;

    fn channels(n: usize) -> Vec<ChannelId> {
        (0..n).map(|i| ChannelId::new(format!("dac/ch{}", i))).collect()
    }

    const VALID_TOML: &str = r#"
        [gates]
        channels = [
            "dac/slot0/ch0", "dac/slot0/ch1", "dac/slot0/ch2",
            "dac/slot0/ch3", "dac/slot0/ch4", "dac/slot0/ch5",
            "dac/slot1/ch0", "dac/slot1/ch1",
        ]
        reference_point = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.1, -0.1]
    "#;

    // ────────────────────────────────────────────────────────────────────────
    // VALIDATION
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_valid_config_passes() {
        let config = GateConfig::new(channels(ROLLBACK_GATES), vec![0.0; ROLLBACK_GATES]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tuned_width_alone_is_rejected() {
        // 6 entries tune fine but cannot satisfy an 8-channel rollback.
        let config = GateConfig::new(channels(TUNED_GATES), vec![0.0; TUNED_GATES]);
        assert!(matches!(
            config.validate(),
            Err(GateError::MappingTooShort { required: 8, got: 6 })
        ));
    }

    #[test]
    fn test_short_reference_rejected() {
        let mut config = GateConfig::new(channels(ROLLBACK_GATES), vec![0.0; ROLLBACK_GATES]);
        config.reference_point.truncate(7);
        assert!(matches!(
            config.validate(),
            Err(GateError::ReferenceTooShort { required: 8, got: 7 })
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let config = GateConfig::new(channels(9), vec![0.0; ROLLBACK_GATES]);
        assert!(matches!(
            config.validate(),
            Err(GateError::LengthMismatch { channels: 9, reference: 8 })
        ));
    }

    #[test]
    fn test_nonpositive_tolerance_rejected() {
        let mut config = GateConfig::new(channels(ROLLBACK_GATES), vec![0.0; ROLLBACK_GATES]);
        config.tolerance = 0.0;
        assert!(matches!(
            config.validate(),
            Err(GateError::InvalidTolerance { .. })
        ));

        config.tolerance = -5e-3;
        assert!(matches!(
            config.validate(),
            Err(GateError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn test_nan_tolerance_rejected() {
        let mut config = GateConfig::new(channels(ROLLBACK_GATES), vec![0.0; ROLLBACK_GATES]);
        config.tolerance = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(GateError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let mut ids = channels(ROLLBACK_GATES);
        ids[7] = ids[0].clone();
        let config = GateConfig::new(ids, vec![0.0; ROLLBACK_GATES]);
        assert!(matches!(
            config.validate(),
            Err(GateError::DuplicateChannel { .. })
        ));
    }

    // ────────────────────────────────────────────────────────────────────────
    // TOML PARSING
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_valid_toml() {
        let config = GateConfig::from_toml_str(VALID_TOML).unwrap();
        assert_eq!(config.channels.len(), 8);
        assert_eq!(config.reference_point[6], -0.1);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_explicit_tolerance_overrides_default() {
        let text = format!("{}\ntolerance = 2e-3\n", VALID_TOML.trim_end());
        let config = GateConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.tolerance, 2e-3);
    }

    #[test]
    fn test_missing_gates_section_rejected() {
        let err = GateConfig::from_toml_str("[other]\nx = 1\n").unwrap_err();
        match err {
            GateError::ConfigParse { message } => assert!(message.contains("[gates]")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            GateConfig::from_toml_str("[gates\nchannels = ["),
            Err(GateError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_short_mapping() {
        let text = r#"
            [gates]
            channels = ["a", "b", "c", "d", "e", "f"]
            reference_point = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        "#;
        assert!(matches!(
            GateConfig::from_toml_str(text),
            Err(GateError::MappingTooShort { .. })
        ));
    }

    // ────────────────────────────────────────────────────────────────────────
    // FILE LOADING
    // ────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        let config = GateConfig::load(Some(&path)).unwrap();
        assert_eq!(config.channels.len(), 8);
    }

    #[test]
    fn test_load_missing_file_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = GateConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, GateError::ConfigRead { .. }));
    }
}
