//! Autonomous reporting.
//!
//! On every report tick the [`PushReporter`] copies the latest sensor
//! values into the shared state and, when autonomous reporting is on,
//! writes one data frame per monitored field.  Frames that the transport
//! refuses are dropped and counted; there is no retry.

use log::warn;

use super::codec;
use super::commands::CommandCode;
use super::frame::{FrameType, MAX_FRAME_LEN};
use super::transport::Transport;
use crate::app::dispatcher::value_payload;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SensorPort};
use crate::app::state::StateCell;

/// Samples the sensor and pushes state to the host.
pub struct PushReporter {
    /// Frames written successfully.
    pushed_count: u32,
    /// Frames dropped because the transport could not take them.
    dropped_count: u32,
}

impl PushReporter {
    pub fn new() -> Self {
        Self {
            pushed_count: 0,
            dropped_count: 0,
        }
    }

    /// Run one report tick.  Returns the number of frames written.
    pub fn report<T: Transport>(
        &mut self,
        state: &StateCell,
        transport: &mut T,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let readings = sensor.sample_latest();
        let lead_off = sensor.is_lead_off();

        let (lead_changed, snapshot) = state.update(|s| {
            let changed = s.lead_off != lead_off;
            s.readings = readings;
            s.lead_off = lead_off;
            (changed, *s)
        });
        if lead_changed {
            sink.emit(&AppEvent::LeadChanged(lead_off));
        }

        if !snapshot.autonomous {
            return 0;
        }

        let mut written = 0;
        let mut buf = [0u8; MAX_FRAME_LEN];
        for code in CommandCode::PUSHED {
            let payload = value_payload(code, &snapshot);
            let len = match codec::encode_into(FrameType::Data, &payload, &mut buf) {
                Ok(len) => len,
                Err(e) => {
                    warn!("push: encode failed for {:?}: {}", code, e);
                    self.record_drop();
                    continue;
                }
            };
            match transport.write(&buf[..len]) {
                Ok(()) => {
                    written += 1;
                    self.pushed_count = self.pushed_count.saturating_add(1);
                }
                Err(e) => {
                    warn!("push: write failed for {:?}: {:?}", code, e);
                    self.record_drop();
                }
            }
        }
        if written > 0 {
            if let Err(e) = transport.flush() {
                warn!("push: flush failed: {:?}", e);
            }
        }
        written
    }

    /// Record a dropped frame (transport couldn't keep up).
    pub fn record_drop(&mut self) {
        self.dropped_count = self.dropped_count.saturating_add(1);
    }

    pub fn pushed_count(&self) -> u32 {
        self.pushed_count
    }

    pub fn dropped_count(&self) -> u32 {
        self.dropped_count
    }
}

impl Default for PushReporter {
    fn default() -> Self {
        Self::new()
    }
}
