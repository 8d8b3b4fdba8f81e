//! ADC18 settings payloads.
//!
//! `SetAdcConversionMode` and `SetAdcDataRate` carry a one-byte payload
//! taken from the MAX22005 (ADC18 click) register tables.

use serde::{Deserialize, Serialize};

/// Conversion mode of the force/torque ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConversionMode {
    Continuous = 0x00,
    SingleCycle = 0x02,
    ContinuousSingleCycle = 0x03,
}

impl ConversionMode {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Sample rate of the force/torque ADC, in samples per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataRate {
    Sps1 = 0x00,
    Sps3 = 0x01,
    Sps5 = 0x02,
    Sps10 = 0x03,
    Sps13 = 0x04,
    Sps15 = 0x05,
    Sps50 = 0x06,
    Sps60 = 0x07,
    Sps150 = 0x08,
    Sps300 = 0x09,
    Sps900 = 0x0A,
    Sps1800 = 0x0B,
    Sps2880 = 0x0C,
    Sps5760 = 0x0D,
    Sps11520 = 0x0E,
    Sps23040 = 0x0F,
}

impl DataRate {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Nominal rate in samples per second.
    pub const fn samples_per_second(self) -> u32 {
        match self {
            DataRate::Sps1 => 1,
            DataRate::Sps3 => 3,
            DataRate::Sps5 => 5,
            DataRate::Sps10 => 10,
            DataRate::Sps13 => 13,
            DataRate::Sps15 => 15,
            DataRate::Sps50 => 50,
            DataRate::Sps60 => 60,
            DataRate::Sps150 => 150,
            DataRate::Sps300 => 300,
            DataRate::Sps900 => 900,
            DataRate::Sps1800 => 1800,
            DataRate::Sps2880 => 2880,
            DataRate::Sps5760 => 5760,
            DataRate::Sps11520 => 11520,
            DataRate::Sps23040 => 23040,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_mode_codes_match_register_table() {
        assert_eq!(ConversionMode::Continuous.code(), 0x00);
        assert_eq!(ConversionMode::SingleCycle.code(), 0x02);
        assert_eq!(ConversionMode::ContinuousSingleCycle.code(), 0x03);
    }

    #[test]
    fn data_rate_codes_are_contiguous() {
        assert_eq!(DataRate::Sps1.code(), 0x00);
        assert_eq!(DataRate::Sps60.code(), 0x07);
        assert_eq!(DataRate::Sps23040.code(), 0x0F);
    }

    #[test]
    fn data_rates_order_by_speed() {
        assert!(DataRate::Sps1 < DataRate::Sps23040);
        assert!(DataRate::Sps60.samples_per_second() < DataRate::Sps150.samples_per_second());
        assert_eq!(DataRate::Sps23040.samples_per_second(), 23040);
    }
}
