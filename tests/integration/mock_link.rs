//! Mock adapters for integration tests.
//!
//! Records every sensor call, every emitted event and every written byte
//! so tests can assert on the full history of a session.

use std::collections::VecDeque;

use ecglink::app::events::AppEvent;
use ecglink::app::ports::{EventSink, SensorPort};
use ecglink::app::state::Readings;
use ecglink::protocol::codec::encode;
use ecglink::protocol::frame::{Frame, FrameType};
use ecglink::protocol::stream::FrameStream;
use ecglink::protocol::transport::Transport;

// ── Transport ─────────────────────────────────────────────────

/// In-memory serial line.  Tests push host bytes in and read device
/// frames out.
pub struct MockTransport {
    inbound: VecDeque<u8>,
    pub outbound: Vec<u8>,
    pub connected: bool,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            connected: true,
            fail_writes: false,
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    pub fn push_command(&mut self, payload: &[u8]) {
        let bytes = encode(FrameType::Command, payload).unwrap();
        self.push_bytes(&bytes);
    }

    /// Decode and clear everything written so far.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        let bytes = std::mem::take(&mut self.outbound);
        FrameStream::with_max_buffer(512).feed(&bytes)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    type Error = &'static str;

    fn available(&self) -> usize {
        self.inbound.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.inbound.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err("tx full");
        }
        self.outbound.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── Sensor ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCall {
    On,
    Off,
}

pub struct MockSensor {
    pub calls: Vec<SensorCall>,
    pub readings: Readings,
    pub lead_off: bool,
    pub samples_taken: u32,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            readings: Readings {
                raw: 0x0ABC,
                filtered: -300,
                heart_rate_bpm: 75,
            },
            lead_off: false,
            samples_taken: 0,
        }
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockSensor {
    fn on(&mut self) {
        self.calls.push(SensorCall::On);
    }

    fn off(&mut self) {
        self.calls.push(SensorCall::Off);
    }

    fn is_lead_off(&mut self) -> bool {
        self.lead_off
    }

    fn sample_latest(&mut self) -> Readings {
        self.samples_taken += 1;
        self.readings
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
