//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the sensor link end to
//! end against mock adapters.  All tests run on the host with no real
//! serial port or front end required.

mod link_tests;
mod mock_link;
