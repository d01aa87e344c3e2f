//! Framed serial protocol between a host and the sensor link.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Protocol Stack                         │
//! │                                                            │
//! │  ┌───────────┐   ┌─────────────┐   ┌──────────────────┐   │
//! │  │ Transport │──▶│ FrameStream │──▶│   FrameQueue     │   │
//! │  │ (trait)   │   │ (scanner)   │   │ → Dispatcher     │   │
//! │  └───────────┘   └─────────────┘   └──────────────────┘   │
//! │       ▲                                    │               │
//! │       │              ┌─────────────────────┘               │
//! │       │              ▼                                     │
//! │  ┌───────────┐   ┌─────────────┐                           │
//! │  │ Transport │◀──│ PushReporter│   (autonomous reports)    │
//! │  │ (write)   │   │ / replies   │                           │
//! │  └───────────┘   └─────────────┘                           │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod commands;
pub mod frame;
pub mod push;
pub mod stats;
pub mod stream;
pub mod transport;
