//! Link configuration parameters
//!
//! All tunable parameters for one sensor link session.
//! Values can be loaded from a JSON file (see
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::app::state::ReportRate;
use crate::protocol::frame::MIN_FRAME_LEN;
use crate::protocol::stream::{DEFAULT_MAX_BUFFER, MAX_BUFFER_LIMIT};

/// Enumerated report-rate set for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProfile {
    /// Trend monitoring: 1, 2 or 5 Hz.
    Slow,
    /// Waveform streaming: 50, 100 or 125 Hz.
    Fast,
}

impl RateProfile {
    pub const fn allowed_hz(self) -> &'static [u8] {
        match self {
            Self::Slow => &[1, 2, 5],
            Self::Fast => &[50, 100, 125],
        }
    }

    /// Validate `hz` against this profile.
    pub fn rate(self, hz: u8) -> Option<ReportRate> {
        self.allowed_hz().contains(&hz).then_some(ReportRate(hz))
    }

    pub fn default_rate(self) -> ReportRate {
        match self {
            Self::Slow => ReportRate(1),
            Self::Fast => ReportRate(100),
        }
    }
}

/// How set requests (report rate, autonomous reporting, run/stop) behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandProfile {
    /// Set requests change state and switch the sensor on/off.
    Control,
    /// Every request is answered with the current value; nothing changes.
    Monitor,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    // --- Parse trigger ---
    /// Poll interval for the receive path (milliseconds)
    pub parse_interval_ms: u32,
    /// Receive buffer cap before a full clear (bytes)
    pub max_buffer_size: usize,

    // --- Report trigger ---
    /// Allowed report-rate set
    pub rate_profile: RateProfile,
    /// Initial report rate (Hz), must belong to `rate_profile`
    pub report_rate_hz: u8,
    /// Start with autonomous reporting enabled
    pub autonomous_reporting: bool,

    // --- Commands ---
    pub command_profile: CommandProfile,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            parse_interval_ms: 10,
            max_buffer_size: DEFAULT_MAX_BUFFER,

            rate_profile: RateProfile::Slow,
            report_rate_hz: 1,
            autonomous_reporting: false,

            command_profile: CommandProfile::Control,
        }
    }
}

impl LinkConfig {
    /// Reject values the link cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parse_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("parse_interval_ms must be > 0"));
        }
        if self.max_buffer_size < MIN_FRAME_LEN {
            return Err(ConfigError::ValidationFailed(
                "max_buffer_size smaller than a minimal frame",
            ));
        }
        if self.max_buffer_size > MAX_BUFFER_LIMIT {
            return Err(ConfigError::ValidationFailed("max_buffer_size above 512"));
        }
        if self.rate_profile.rate(self.report_rate_hz).is_none() {
            return Err(ConfigError::ValidationFailed(
                "report_rate_hz not in rate_profile",
            ));
        }
        Ok(())
    }

    /// Initial report rate, falling back to the profile default.
    pub fn report_rate(&self) -> ReportRate {
        self.rate_profile
            .rate(self.report_rate_hz)
            .unwrap_or_else(|| self.rate_profile.default_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = LinkConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.report_rate().hz(), 1);
        assert_eq!(c.max_buffer_size, 256);
    }

    #[test]
    fn serde_roundtrip() {
        let mut c = LinkConfig::default();
        c.rate_profile = RateProfile::Fast;
        c.report_rate_hz = 125;
        c.command_profile = CommandProfile::Monitor;
        let json = serde_json::to_string(&c).unwrap();
        let c2: LinkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: LinkConfig = serde_json::from_str(r#"{"parse_interval_ms": 5}"#).unwrap();
        assert_eq!(c.parse_interval_ms, 5);
        assert_eq!(c.rate_profile, RateProfile::Slow);
        assert_eq!(c.command_profile, CommandProfile::Control);
    }

    #[test]
    fn profile_names_are_snake_case() {
        let c: LinkConfig =
            serde_json::from_str(r#"{"rate_profile": "fast", "report_rate_hz": 50}"#).unwrap();
        assert!(c.validate().is_ok());
        assert_eq!(c.report_rate().hz(), 50);
    }

    #[test]
    fn rate_outside_profile_rejected() {
        let c = LinkConfig {
            report_rate_hz: 50,
            ..LinkConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
        // Falls back to the profile default rather than an invalid rate.
        assert_eq!(c.report_rate().hz(), 1);
    }

    #[test]
    fn buffer_bounds_enforced() {
        let small = LinkConfig {
            max_buffer_size: 3,
            ..LinkConfig::default()
        };
        let big = LinkConfig {
            max_buffer_size: 4096,
            ..LinkConfig::default()
        };
        assert!(small.validate().is_err());
        assert!(big.validate().is_err());
    }

    #[test]
    fn zero_parse_interval_rejected() {
        let c = LinkConfig {
            parse_interval_ms: 0,
            ..LinkConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn profiles_enumerate_their_rates() {
        assert!(RateProfile::Slow.rate(2).is_some());
        assert!(RateProfile::Slow.rate(3).is_none());
        assert!(RateProfile::Fast.rate(100).is_some());
        assert!(RateProfile::Fast.rate(5).is_none());
        for p in [RateProfile::Slow, RateProfile::Fast] {
            assert!(p.allowed_hz().contains(&p.default_rate().hz()));
        }
    }
}
