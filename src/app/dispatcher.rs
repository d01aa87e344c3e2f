//! Command dispatcher: maps an inbound frame to a state change and a reply.
//!
//! Payload byte 0 is the command code, byte 1 (if present) the argument.
//! Replies are data frames carrying `[code, value...]`, multi-byte values
//! big-endian.  The same encoding is used for autonomous pushes, see
//! [`value_payload`].

use std::sync::Arc;

use log::{debug, warn};

use super::events::AppEvent;
use super::ports::{EventSink, SensorPort};
use super::state::{InstrumentState, OperatingMode, StateCell};
use crate::config::{CommandProfile, RateProfile};
use crate::protocol::commands::CommandCode;
use crate::protocol::frame::{Frame, FrameType};

/// Longest reply payload: code + 16-bit value.
pub const MAX_VALUE_PAYLOAD: usize = 3;

/// Encode the current value for `code` as `[code, value...]`.
pub fn value_payload(
    code: CommandCode,
    state: &InstrumentState,
) -> heapless::Vec<u8, MAX_VALUE_PAYLOAD> {
    let mut buf = [code.as_byte(), 0, 0];
    let len = match code {
        CommandCode::RawValue => {
            buf[1..].copy_from_slice(&state.readings.raw.to_be_bytes());
            3
        }
        CommandCode::FilteredValue => {
            buf[1..].copy_from_slice(&state.readings.filtered.to_be_bytes());
            3
        }
        CommandCode::LeadStatus => {
            buf[1] = u8::from(state.lead_off);
            2
        }
        CommandCode::ReportRate => {
            buf[1] = state.report_rate.hz();
            2
        }
        CommandCode::AutoReport => {
            buf[1] = u8::from(state.autonomous);
            2
        }
        CommandCode::RunStop | CommandCode::OperatingStatus => {
            buf[1] = state.mode.as_byte();
            2
        }
        CommandCode::HeartRate => {
            buf[1] = state.readings.heart_rate_bpm;
            2
        }
    };
    heapless::Vec::from_slice(&buf[..len]).unwrap_or_default()
}

/// Turns command frames into state mutations and replies.
pub struct CommandDispatcher {
    state: Arc<StateCell>,
    command_profile: CommandProfile,
    rate_profile: RateProfile,
}

impl CommandDispatcher {
    pub fn new(
        state: Arc<StateCell>,
        command_profile: CommandProfile,
        rate_profile: RateProfile,
    ) -> Self {
        Self {
            state,
            command_profile,
            rate_profile,
        }
    }

    pub fn command_profile(&self) -> CommandProfile {
        self.command_profile
    }

    /// Handle one inbound frame.  Returns the reply, if any.
    ///
    /// Data frames, empty payloads and unknown codes produce no reply.
    /// A report rate outside the active profile is rejected with no reply.
    pub fn handle(
        &mut self,
        frame: &Frame,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Option<Frame> {
        if frame.kind() != FrameType::Command {
            debug!("dispatch: ignoring inbound data frame");
            return None;
        }
        let (&raw_code, rest) = frame.payload().split_first()?;
        let code = match CommandCode::try_from(raw_code) {
            Ok(code) => code,
            Err(unknown) => {
                debug!("dispatch: unknown command 0x{:02X}", unknown);
                return None;
            }
        };
        let arg = rest.first().copied();

        if code.is_settable() && self.command_profile == CommandProfile::Control {
            self.apply(code, arg, sensor, sink)?;
        }

        let state = self.state.get();
        Frame::data(&value_payload(code, &state)).ok()
    }

    /// Apply a set/toggle request.  `None` means the request was rejected.
    fn apply(
        &mut self,
        code: CommandCode,
        arg: Option<u8>,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Option<()> {
        match code {
            CommandCode::ReportRate => {
                let hz = arg?;
                let Some(rate) = self.rate_profile.rate(hz) else {
                    warn!(
                        "dispatch: report rate {} Hz not in {:?} profile, ignored",
                        hz, self.rate_profile
                    );
                    sink.emit(&AppEvent::RateRejected(hz));
                    return None;
                };
                let changed = self.state.update(|s| {
                    let changed = s.report_rate != rate;
                    s.report_rate = rate;
                    changed
                });
                if changed {
                    sink.emit(&AppEvent::ReportRateChanged(rate));
                }
            }

            CommandCode::AutoReport => {
                let (changed, on) = self.state.update(|s| {
                    let on = arg.map_or(!s.autonomous, |a| a != 0);
                    let changed = on != s.autonomous;
                    s.autonomous = on;
                    (changed, on)
                });
                if changed {
                    sink.emit(&AppEvent::ReportingChanged(on));
                }
            }

            CommandCode::RunStop => {
                let (from, to) = self.state.update(|s| {
                    let from = s.mode;
                    let running = arg.map_or(!from.is_running(), |a| a != 0);
                    s.mode = OperatingMode::from_running(running);
                    (from, s.mode)
                });
                if from != to {
                    // Sensor calls happen outside the state lock.
                    if to.is_running() {
                        sensor.on();
                    } else {
                        sensor.off();
                    }
                    sink.emit(&AppEvent::ModeChanged { from, to });
                }
            }

            _ => {}
        }
        Some(())
    }
}
