//! ecglink: framed UART protocol core for ECG front-end sensor links.
//!
//! Exposes the protocol stack, the session link and the host-side
//! adapters for the simulator binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod link;
pub mod protocol;
pub mod runtime;
pub mod scheduler;

mod error;

pub use error::{Error, FrameError, Result};
