//! Port traits: the boundary between the protocol core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SensorLink / CommandDispatcher
//! ```
//!
//! Driven adapters (sensor front end, event sinks, config storage) implement
//! these traits.  The link consumes them via generics, so the protocol core
//! never touches hardware directly.

use crate::app::state::Readings;
use crate::config::LinkConfig;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: front end → domain)
// ───────────────────────────────────────────────────────────────

/// The acquisition front end.  Sampling and filtering happen behind this
/// trait; the link only reads the latest values.
pub trait SensorPort {
    /// Start acquisition.
    fn on(&mut self);

    /// Stop acquisition.
    fn off(&mut self);

    /// Whether an electrode is detached.
    fn is_lead_off(&mut self) -> bool;

    /// Most recent raw/filtered sample and derived heart rate.
    fn sample_latest(&mut self) -> Readings;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists link configuration.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if nothing
    /// has been stored yet.
    fn load(&self) -> Result<LinkConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &LinkConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and [`LinkConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
