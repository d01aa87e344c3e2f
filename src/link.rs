//! Sensor link session.
//!
//! [`SensorLink`] owns everything one host session needs and exposes a
//! deterministic, clock-free API:
//!
//! - [`advance`](SensorLink::advance) runs the timers.  The parse trigger
//!   polls the transport and queues decoded frames; the report trigger
//!   samples the sensor and pushes values.
//! - [`dispatch_pending`](SensorLink::dispatch_pending) drains the queue,
//!   applies commands and writes replies.
//!
//! The parse trigger never dispatches.  [`runtime`](crate::runtime) runs
//! the two halves as separate tasks; tests call [`tick`](SensorLink::tick).

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::app::dispatcher::CommandDispatcher;
use crate::app::ports::{EventSink, SensorPort};
use crate::app::state::{InstrumentState, OperatingMode, StateCell};
use crate::config::LinkConfig;
use crate::error::{Error, Result};
use crate::protocol::channels::FrameQueue;
use crate::protocol::frame::{Frame, FrameType};
use crate::protocol::push::PushReporter;
use crate::protocol::stats::Statistics;
use crate::protocol::stream::FrameStream;
use crate::protocol::transport::Transport;
use crate::scheduler::{PeriodicScheduler, Triggers};

/// Session counters, serialisable for status dumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub receive: Statistics,
    pub replies_sent: u32,
    pub write_failures: u32,
    pub frames_pushed: u32,
    pub pushes_dropped: u32,
    /// Decoded frames lost because the dispatch queue was full.
    pub queue_drops: u32,
}

/// One host session over one transport.
pub struct SensorLink<T: Transport, S: SensorPort, K: EventSink> {
    transport: T,
    sensor: S,
    sink: K,
    stream: FrameStream,
    queue: Arc<FrameQueue>,
    dispatcher: CommandDispatcher,
    reporter: PushReporter,
    scheduler: PeriodicScheduler,
    state: Arc<StateCell>,
    replies_sent: u32,
    write_failures: u32,
    queue_drops: u32,
}

impl<T: Transport, S: SensorPort, K: EventSink> SensorLink<T, S, K> {
    /// Build a session.  Fails if `config` does not validate.
    pub fn new(config: &LinkConfig, transport: T, sensor: S, sink: K) -> Result<Self> {
        config.validate()?;

        let rate = config.report_rate();
        let state = Arc::new(StateCell::new(InstrumentState::new(
            rate,
            config.autonomous_reporting,
        )));

        info!(
            "link: parse every {} ms, report {} Hz ({:?}), {:?} profile, buffer {} B",
            config.parse_interval_ms,
            rate.hz(),
            config.rate_profile,
            config.command_profile,
            config.max_buffer_size
        );

        Ok(Self {
            transport,
            sensor,
            sink,
            stream: FrameStream::with_max_buffer(config.max_buffer_size),
            queue: Arc::new(FrameQueue::new()),
            dispatcher: CommandDispatcher::new(
                Arc::clone(&state),
                config.command_profile,
                config.rate_profile,
            ),
            reporter: PushReporter::new(),
            scheduler: PeriodicScheduler::new(config.parse_interval_ms, rate),
            state,
            replies_sent: 0,
            write_failures: 0,
            queue_drops: 0,
        })
    }

    // ── Triggers ───────────────────────────────────────────────

    /// Advance the timers by `delta_ms` and run whatever fired.
    ///
    /// Frames decoded by the parse trigger are queued, not dispatched.
    pub fn advance(&mut self, delta_ms: u32) -> Triggers {
        self.scheduler.set_parse_enabled(self.transport.is_connected());

        let triggers = self.scheduler.tick(delta_ms);
        if triggers.parse {
            self.poll_transport();
        }
        if triggers.report {
            self.reporter.report(
                &self.state,
                &mut self.transport,
                &mut self.sensor,
                &mut self.sink,
            );
        }
        triggers
    }

    /// Handle one frame and write its reply.  Returns `true` if a reply
    /// was written.
    pub fn dispatch(&mut self, frame: &Frame) -> bool {
        let replied = match self.dispatcher.handle(frame, &mut self.sensor, &mut self.sink) {
            Some(reply) => self.write_frame(&reply).is_ok(),
            None => false,
        };
        // A rate change restarts the report timer only.
        self.scheduler.set_report_rate(self.state.get().report_rate);
        replied
    }

    /// Dispatch every queued frame.  Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(frame) = self.queue.try_receive() {
            self.dispatch(&frame);
            handled += 1;
        }
        handled
    }

    /// [`advance`](Self::advance) followed by
    /// [`dispatch_pending`](Self::dispatch_pending).
    pub fn tick(&mut self, delta_ms: u32) -> Triggers {
        let triggers = self.advance(delta_ms);
        self.dispatch_pending();
        triggers
    }

    // ── Outbound ───────────────────────────────────────────────

    /// Encode and write an arbitrary frame.
    pub fn send(&mut self, kind: FrameType, payload: &[u8]) -> Result<()> {
        let frame = Frame::new(kind, payload)?;
        self.write_frame(&frame)
    }

    /// Switch the sensor off if it is running and drop partial input.
    /// Called when the session ends.
    pub fn close(&mut self) {
        let was_running = self.state.update(|s| {
            let was = s.mode.is_running();
            s.mode = OperatingMode::Stopped;
            was
        });
        if was_running {
            self.sensor.off();
        }
        self.stream.reset();
        while self.queue.try_receive().is_ok() {}
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn stats(&self) -> LinkStats {
        LinkStats {
            receive: *self.stream.stats(),
            replies_sent: self.replies_sent,
            write_failures: self.write_failures,
            frames_pushed: self.reporter.pushed_count(),
            pushes_dropped: self.reporter.dropped_count(),
            queue_drops: self.queue_drops,
        }
    }

    /// Clear the receive counters.
    pub fn reset_stats(&mut self) {
        self.stream.reset_stats();
    }

    pub fn state(&self) -> InstrumentState {
        self.state.get()
    }

    pub fn state_handle(&self) -> Arc<StateCell> {
        Arc::clone(&self.state)
    }

    /// Handle to the dispatch queue, for a task that awaits frames.
    pub fn queue_handle(&self) -> Arc<FrameQueue> {
        Arc::clone(&self.queue)
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn scheduler(&self) -> &PeriodicScheduler {
        &self.scheduler
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    // ── Internal ───────────────────────────────────────────────

    fn poll_transport(&mut self) {
        for frame in self.stream.poll(&mut self.transport) {
            if self.queue.try_send(frame).is_err() {
                warn!("link: dispatch queue full, frame dropped");
                self.queue_drops = self.queue_drops.saturating_add(1);
            }
        }
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.to_bytes();
        let written = self
            .transport
            .write(&bytes)
            .and_then(|()| self.transport.flush());
        match written {
            Ok(()) => {
                self.replies_sent = self.replies_sent.saturating_add(1);
                Ok(())
            }
            Err(e) => {
                warn!("link: write failed: {:?}", e);
                self.write_failures = self.write_failures.saturating_add(1);
                Err(Error::TransportWrite)
            }
        }
    }
}
