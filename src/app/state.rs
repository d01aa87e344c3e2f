//! Instrument state shared by the dispatch and report paths.
//!
//! Every read and write goes through [`StateCell`], a critical-section
//! mutex around a `Copy` snapshot.  Callers never hold the lock while
//! doing I/O: they copy the state out, or mutate it inside a closure.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::Serialize;

/// Latest values produced by the acquisition front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Readings {
    /// Unfiltered ADC sample.
    pub raw: u16,
    /// Band-passed sample, signed.
    pub filtered: i16,
    pub heart_rate_bpm: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum OperatingMode {
    #[default]
    Stopped = 0,
    Running = 1,
}

impl OperatingMode {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn from_running(running: bool) -> Self {
        if running { Self::Running } else { Self::Stopped }
    }
}

/// Report rate in Hz.  Only obtainable through
/// [`RateProfile::rate`](crate::config::RateProfile::rate), so a value
/// always belongs to some profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRate(pub(crate) u8);

impl ReportRate {
    pub const fn hz(self) -> u8 {
        self.0
    }

    /// Period of the report timer in milliseconds (never zero).
    pub const fn period_ms(self) -> u32 {
        let hz = if self.0 == 0 { 1 } else { self.0 as u32 };
        let period = 1000 / hz;
        if period == 0 { 1 } else { period }
    }
}

/// Snapshot of everything the host can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentState {
    pub readings: Readings,
    pub lead_off: bool,
    pub mode: OperatingMode,
    pub autonomous: bool,
    pub report_rate: ReportRate,
}

impl InstrumentState {
    pub fn new(report_rate: ReportRate, autonomous: bool) -> Self {
        Self {
            readings: Readings::default(),
            lead_off: false,
            mode: OperatingMode::Stopped,
            autonomous,
            report_rate,
        }
    }
}

/// Serialized access to [`InstrumentState`].  Share it with `Arc`.
pub struct StateCell {
    inner: Mutex<CriticalSectionRawMutex, Cell<InstrumentState>>,
}

impl StateCell {
    pub fn new(state: InstrumentState) -> Self {
        Self {
            inner: Mutex::new(Cell::new(state)),
        }
    }

    /// Copy of the current state.
    pub fn get(&self) -> InstrumentState {
        self.inner.lock(Cell::get)
    }

    /// Mutate the state atomically.  Returns whatever `f` returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut InstrumentState) -> R) -> R {
        self.inner.lock(|cell| {
            let mut state = cell.get();
            let out = f(&mut state);
            cell.set(state);
            out
        })
    }
}
