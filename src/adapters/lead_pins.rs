//! Lead-off detection from comparator outputs.
//!
//! ECG front ends flag a detached electrode on two digital outputs
//! (LO+ and LO-).  Either line high means the lead is off.  The pins are
//! anything implementing `embedded_hal::digital::InputPin`, so the same
//! code runs against a HAL or a test double.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::SensorPort;
use crate::app::state::Readings;

/// The LO+ / LO- comparator pair.
pub struct LeadOffPins<P: InputPin, M: InputPin> {
    lo_plus: P,
    lo_minus: M,
}

impl<P: InputPin, M: InputPin> LeadOffPins<P, M> {
    pub fn new(lo_plus: P, lo_minus: M) -> Self {
        Self { lo_plus, lo_minus }
    }

    /// `true` if either electrode is detached.  A pin that cannot be read
    /// counts as detached.
    pub fn is_lead_off(&mut self) -> bool {
        let plus = self.lo_plus.is_high().unwrap_or_else(|e| {
            warn!("lead-pins: LO+ read failed: {:?}", e);
            true
        });
        let minus = self.lo_minus.is_high().unwrap_or_else(|e| {
            warn!("lead-pins: LO- read failed: {:?}", e);
            true
        });
        plus || minus
    }
}

/// A sensor whose lead-off status comes from dedicated pins instead of the
/// sample source.
pub struct WithLeadPins<S: SensorPort, P: InputPin, M: InputPin> {
    sensor: S,
    pins: LeadOffPins<P, M>,
}

impl<S: SensorPort, P: InputPin, M: InputPin> WithLeadPins<S, P, M> {
    pub fn new(sensor: S, pins: LeadOffPins<P, M>) -> Self {
        Self { sensor, pins }
    }

    pub fn inner(&self) -> &S {
        &self.sensor
    }
}

impl<S: SensorPort, P: InputPin, M: InputPin> SensorPort for WithLeadPins<S, P, M> {
    fn on(&mut self) {
        self.sensor.on();
    }

    fn off(&mut self) {
        self.sensor.off();
    }

    fn is_lead_off(&mut self) -> bool {
        self.pins.is_lead_off()
    }

    fn sample_latest(&mut self) -> Readings {
        self.sensor.sample_latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim_sensor::SimulatedEcg;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct Pin(Result<bool, ErrorKind>);

    impl ErrorType for Pin {
        type Error = ErrorKind;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            self.0
        }
        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            self.0.map(|high| !high)
        }
    }

    #[test]
    fn either_line_high_means_lead_off() {
        assert!(!LeadOffPins::new(Pin(Ok(false)), Pin(Ok(false))).is_lead_off());
        assert!(LeadOffPins::new(Pin(Ok(true)), Pin(Ok(false))).is_lead_off());
        assert!(LeadOffPins::new(Pin(Ok(false)), Pin(Ok(true))).is_lead_off());
    }

    #[test]
    fn unreadable_pin_counts_as_lead_off() {
        assert!(LeadOffPins::new(Pin(Err(ErrorKind::Other)), Pin(Ok(false))).is_lead_off());
    }

    #[test]
    fn wrapper_takes_lead_status_from_pins() {
        let mut s = WithLeadPins::new(
            SimulatedEcg::new(72),
            LeadOffPins::new(Pin(Ok(true)), Pin(Ok(false))),
        );
        assert!(s.is_lead_off());
        s.on();
        assert!(s.inner().is_running());
        assert_eq!(s.sample_latest().heart_rate_bpm, 72);
    }
}
