//! Application core: instrument state and command handling, zero I/O.
//!
//! All interaction with the sensor and the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod state;
