//! Periodic trigger engine.
//!
//! Two independent timers drive a link session: the parse timer (poll the
//! transport, queue frames for dispatch) and the report timer (sample the
//! sensor, push values when autonomous reporting is on).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │        ┌───────────────┐              ┌───────────────┐      │
//! │        │ Parse timer   │              │ Report timer  │      │
//! │        │ (fixed)       │              │ (1000/rate ms)│      │
//! │        └───────┬───────┘              └───────┬───────┘      │
//! │                │                              │              │
//! │                ▼                              ▼              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                 Triggers { parse, report }             │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                  SensorLink::advance()                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler knows nothing about frames or sensors.  It is driven by
//! elapsed milliseconds, which keeps it testable without a clock.

use log::info;

use crate::app::state::ReportRate;

// ═══════════════════════════════════════════════════════════════
//  Single timer
// ═══════════════════════════════════════════════════════════════

/// Fixed-period timer advanced by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    period_ms: u32,
    elapsed_ms: u32,
}

impl PeriodicTimer {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
        }
    }

    /// Advance by `delta_ms`.  Returns `true` if the period elapsed.
    ///
    /// Fires at most once per call.  When the caller falls behind by more
    /// than a period, the backlog is dropped instead of bursting.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.elapsed_ms < self.period_ms {
            return false;
        }
        self.elapsed_ms %= self.period_ms;
        true
    }

    /// Change the period and restart the phase.
    pub fn reset(&mut self, period_ms: u32) {
        self.period_ms = period_ms.max(1);
        self.elapsed_ms = 0;
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Time since the last firing (the timer's phase).
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// What fired during one [`PeriodicScheduler::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers {
    pub parse: bool,
    pub report: bool,
}

/// Parse and report timers for one session.
pub struct PeriodicScheduler {
    parse: PeriodicTimer,
    report: PeriodicTimer,
    report_rate: ReportRate,
    parse_enabled: bool,
}

impl PeriodicScheduler {
    pub fn new(parse_interval_ms: u32, report_rate: ReportRate) -> Self {
        Self {
            parse: PeriodicTimer::new(parse_interval_ms),
            report: PeriodicTimer::new(report_rate.period_ms()),
            report_rate,
            parse_enabled: true,
        }
    }

    /// Advance both timers by `delta_ms`.
    ///
    /// While parsing is disabled the parse timer is not advanced at all.
    pub fn tick(&mut self, delta_ms: u32) -> Triggers {
        Triggers {
            parse: self.parse_enabled && self.parse.tick(delta_ms),
            report: self.report.tick(delta_ms),
        }
    }

    /// Reinitialise the report timer for `rate`.  The parse timer's phase
    /// is left untouched.  No-op if the rate is unchanged.
    pub fn set_report_rate(&mut self, rate: ReportRate) {
        if rate == self.report_rate {
            return;
        }
        info!(
            "Scheduler: report rate {} Hz -> {} Hz",
            self.report_rate.hz(),
            rate.hz()
        );
        self.report_rate = rate;
        self.report.reset(rate.period_ms());
    }

    pub fn set_parse_enabled(&mut self, enabled: bool) {
        self.parse_enabled = enabled;
    }

    pub fn parse_enabled(&self) -> bool {
        self.parse_enabled
    }

    pub fn report_rate(&self) -> ReportRate {
        self.report_rate
    }

    pub fn parse_timer(&self) -> &PeriodicTimer {
        &self.parse
    }

    pub fn report_timer(&self) -> &PeriodicTimer {
        &self.report
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
