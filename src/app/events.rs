//! Outbound application events.
//!
//! The [`CommandDispatcher`](super::dispatcher::CommandDispatcher) and the
//! [`PushReporter`](crate::protocol::push::PushReporter) emit these through
//! the [`EventSink`](super::ports::EventSink) port.

use super::state::{OperatingMode, ReportRate};

/// Structured events emitted by the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Acquisition started or stopped.
    ModeChanged {
        from: OperatingMode,
        to: OperatingMode,
    },

    /// Autonomous reporting switched on or off.
    ReportingChanged(bool),

    /// The report rate was changed.
    ReportRateChanged(ReportRate),

    /// A host asked for a rate outside the active profile.
    RateRejected(u8),

    /// Lead-off status flipped (`true` = lead off).
    LeadChanged(bool),
}
