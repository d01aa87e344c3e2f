//! Synthetic ECG front end.
//!
//! Stands in for the analog front end on the host.  Produces a periodic
//! P-QRS-T complex at the configured heart rate on a 12-bit ADC scale.
//! The filtered channel is the same complex without baseline wander; no
//! real filtering happens here.

use std::time::Instant;

use log::info;

use crate::app::ports::SensorPort;
use crate::app::state::Readings;

/// ADC mid-scale (12-bit converter).
const ADC_BASELINE: f32 = 2048.0;
const ADC_MAX: f32 = 4095.0;

/// (centre as fraction of the beat, width, amplitude in ADC counts)
const WAVES: [(f32, f32, f32); 5] = [
    (0.20, 0.025, 90.0),    // P
    (0.28, 0.010, -120.0),  // Q
    (0.30, 0.012, 1200.0),  // R
    (0.32, 0.010, -250.0),  // S
    (0.55, 0.045, 300.0),   // T
];

/// Simulated sensor driven by wall-clock time.
pub struct SimulatedEcg {
    heart_rate_bpm: u8,
    started: Option<Instant>,
    lead_off: bool,
}

impl SimulatedEcg {
    pub fn new(heart_rate_bpm: u8) -> Self {
        Self {
            heart_rate_bpm: heart_rate_bpm.clamp(20, 250),
            started: None,
            lead_off: false,
        }
    }

    /// Simulate an electrode being detached or reattached.
    pub fn set_lead_off(&mut self, off: bool) {
        self.lead_off = off;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Readings `t_ms` milliseconds after acquisition started.
    pub fn readings_at(&self, t_ms: u64) -> Readings {
        if self.lead_off {
            // A floating input rails to full scale and carries no beat.
            return Readings {
                raw: ADC_MAX as u16,
                filtered: 0,
                heart_rate_bpm: 0,
            };
        }

        let beat_ms = 60_000.0 / f32::from(self.heart_rate_bpm);
        let phase = (t_ms as f32 % beat_ms) / beat_ms;
        let complex: f32 = WAVES
            .iter()
            .map(|&(centre, width, amp)| {
                let x = (phase - centre) / width;
                amp * (-x * x).exp()
            })
            .sum();
        // Slow respiratory wander on the raw channel only.
        let wander = 40.0 * (t_ms as f32 / 4000.0 * core::f32::consts::TAU).sin();

        Readings {
            raw: (ADC_BASELINE + wander + complex).clamp(0.0, ADC_MAX) as u16,
            filtered: complex.round() as i16,
            heart_rate_bpm: self.heart_rate_bpm,
        }
    }
}

impl SensorPort for SimulatedEcg {
    fn on(&mut self) {
        if self.started.is_none() {
            info!("sim-ecg: acquisition on at {} bpm", self.heart_rate_bpm);
            self.started = Some(Instant::now());
        }
    }

    fn off(&mut self) {
        if self.started.take().is_some() {
            info!("sim-ecg: acquisition off");
        }
    }

    fn is_lead_off(&mut self) -> bool {
        self.lead_off
    }

    fn sample_latest(&mut self) -> Readings {
        match self.started {
            Some(start) => self.readings_at(start.elapsed().as_millis() as u64),
            None => Readings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_sensor_reports_nothing() {
        let mut s = SimulatedEcg::new(72);
        assert_eq!(s.sample_latest(), Readings::default());
        s.on();
        assert!(s.is_running());
        assert_eq!(s.sample_latest().heart_rate_bpm, 72);
        s.off();
        assert_eq!(s.sample_latest(), Readings::default());
    }

    #[test]
    fn r_peak_dominates_the_beat() {
        let s = SimulatedEcg::new(60);
        // 60 bpm: one beat per second, R wave at 30 % of the beat.
        let peak = s.readings_at(300);
        let rest = s.readings_at(900);
        assert!(peak.filtered > 1000);
        assert!(rest.filtered.abs() < 50);
        assert!(peak.raw > rest.raw);
    }

    #[test]
    fn waveform_repeats_every_beat() {
        let s = SimulatedEcg::new(60);
        assert_eq!(s.readings_at(300).filtered, s.readings_at(1300).filtered);
    }

    #[test]
    fn lead_off_rails_the_input() {
        let mut s = SimulatedEcg::new(72);
        s.set_lead_off(true);
        assert!(s.is_lead_off());
        let r = s.readings_at(300);
        assert_eq!(r.raw, 4095);
        assert_eq!(r.heart_rate_bpm, 0);
    }

    #[test]
    fn heart_rate_is_clamped() {
        assert_eq!(SimulatedEcg::new(0).readings_at(0).heart_rate_bpm, 20);
        assert_eq!(SimulatedEcg::new(255).readings_at(0).heart_rate_bpm, 250);
    }
}
