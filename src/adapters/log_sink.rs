//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured link events to the
//! `log` facade (stderr on the host simulator, the UART console on a
//! device).  A telemetry uplink would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::ReportingChanged(on) => {
                info!("PUSH | autonomous reporting {}", if *on { "on" } else { "off" });
            }
            AppEvent::ReportRateChanged(rate) => {
                info!("RATE | {} Hz", rate.hz());
            }
            AppEvent::RateRejected(hz) => {
                warn!("RATE | rejected {} Hz", hz);
            }
            AppEvent::LeadChanged(off) => {
                if *off {
                    warn!("LEAD | electrode off");
                } else {
                    info!("LEAD | electrode on");
                }
            }
        }
    }
}
