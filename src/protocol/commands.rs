//! Command codes carried in byte 0 of a frame payload.

/// Codes understood by the dispatcher.  Anything else is ignored so that
/// newer hosts can talk to older devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    /// Latest raw ADC sample (`u16`, big-endian).
    RawValue = 0x01,
    /// Latest filtered sample (`i16`, big-endian).
    FilteredValue = 0x02,
    /// Lead-off flag (`1` = off).
    LeadStatus = 0x03,
    /// Report rate in Hz.
    ReportRate = 0x04,
    /// Autonomous reporting flag.
    AutoReport = 0x05,
    /// Run/stop control.
    RunStop = 0x06,
    /// Operating mode (`0` stopped, `1` running).
    OperatingStatus = 0x07,
    /// Heart rate in beats per minute.
    HeartRate = 0x08,
}

impl CommandCode {
    /// Fields pushed on every report tick when autonomous reporting is on.
    pub const PUSHED: [CommandCode; 5] = [
        Self::RawValue,
        Self::FilteredValue,
        Self::LeadStatus,
        Self::OperatingStatus,
        Self::HeartRate,
    ];

    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the code can change state when an argument is supplied.
    pub const fn is_settable(self) -> bool {
        matches!(self, Self::ReportRate | Self::AutoReport | Self::RunStop)
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0x01 => Ok(Self::RawValue),
            0x02 => Ok(Self::FilteredValue),
            0x03 => Ok(Self::LeadStatus),
            0x04 => Ok(Self::ReportRate),
            0x05 => Ok(Self::AutoReport),
            0x06 => Ok(Self::RunStop),
            0x07 => Ok(Self::OperatingStatus),
            0x08 => Ok(Self::HeartRate),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_u8() {
        for raw in 0x01..=0x08u8 {
            let code = CommandCode::try_from(raw).unwrap();
            assert_eq!(code.as_byte(), raw);
        }
        assert_eq!(CommandCode::try_from(0x00), Err(0x00));
        assert_eq!(CommandCode::try_from(0x09), Err(0x09));
    }

    #[test]
    fn pushed_fields_skip_settings() {
        assert!(CommandCode::PUSHED.iter().all(|c| !c.is_settable()));
    }
}
