//! Deferred-dispatch queue.
//!
//! Uses an `embassy-sync` bounded MPMC channel to move decoded frames out
//! of the parse trigger and into the dispatch path, so the time-critical
//! poll never formats replies or writes to the transport.
//!
//! ```text
//! ┌──────────────┐    Frame     ┌──────────────┐
//! │ Parse timer  │─────────────▶│  Dispatcher  │
//! │ (poll only)  │  FrameQueue  │  (replies)   │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::frame::Frame;

/// Channel depth for decoded inbound frames.
pub const FRAME_QUEUE_DEPTH: usize = 16;

/// Parse trigger → dispatch path.
pub type FrameQueue = Channel<CriticalSectionRawMutex, Frame, FRAME_QUEUE_DEPTH>;
