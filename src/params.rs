//! Numeric codes the instrument uses for ranges, modes, and channels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

macro_rules! coded_enum {
    {
        $(#[$meta:meta])*
        pub enum $name:ident : $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )+
        }
    } => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub fn code(self) -> $repr {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            pub fn from_code(code: $repr) -> Result<Self> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    _ => Err(Error::out_of_range(stringify!($name), code)),
                }
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = Error;

            fn try_from(code: $repr) -> Result<Self> {
                Self::from_code(code)
            }
        }
    };
}

coded_enum! {
    /// Voltage output ranges. `Min*` ranges select the lowest range covering the output value,
    /// but never below the named one.
    #[derive(Default)]
    pub enum VOutputRange: i32 {
        #[default]
        Auto = 0,
        Min0V2 = 2,
        Min0V5 = 5,
        Min2V = 20,
        Min5V = 50,
        Min20V = 200,
        Min40V = 400,
        Min100V = 1000,
        Min200V = 2000,
        Min500V = 5000,
        Min1500V = 15000,
        Min3000V = 30000,
        Min10kV = 100000,
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum IOutputRange: i32 {
        #[default]
        Auto = 0,
        Min1pA = 8,
        Min10pA = 9,
        Min100pA = 10,
        Min1nA = 11,
        Min10nA = 12,
        Min100nA = 13,
        Min1uA = 14,
        Min10uA = 15,
        Min100uA = 16,
        Min1mA = 17,
        Min10mA = 18,
        Min100mA = 19,
        Min1A = 20,
        Min2A = 21,
        Min20A = 22,
        Min40A = 23,
        Min500A = 26,
        Min1500A = 27,
    }
}

coded_enum! {
    /// Voltage measurement ranges. `Fix*` ranges hold the named range, `Min*` auto-range above it.
    #[derive(Default)]
    pub enum VMeasRange: i32 {
        #[default]
        Auto = 0,
        Min0V5 = 5,
        Min2V = 20,
        Min5V = 50,
        Min20V = 200,
        Min40V = 400,
        Min100V = 1000,
        Min200V = 2000,
        Fix0V5 = -5,
        Fix2V = -20,
        Fix5V = -50,
        Fix20V = -200,
        Fix40V = -400,
        Fix100V = -1000,
        Fix200V = -2000,
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum IMeasRange: i32 {
        #[default]
        Auto = 0,
        Min1pA = 8,
        Min10pA = 9,
        Min100pA = 10,
        Min1nA = 11,
        Min10nA = 12,
        Min100nA = 13,
        Min1uA = 14,
        Min10uA = 15,
        Min100uA = 16,
        Min1mA = 17,
        Min10mA = 18,
        Min100mA = 19,
        Min1A = 20,
        Fix1pA = -8,
        Fix10pA = -9,
        Fix100pA = -10,
        Fix1nA = -11,
        Fix10nA = -12,
        Fix100nA = -13,
        Fix1uA = -14,
        Fix10uA = -15,
        Fix100uA = -16,
        Fix1mA = -17,
        Fix10mA = -18,
        Fix100mA = -19,
        Fix1A = -20,
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum CompliancePolarity: u8 {
        #[default]
        Auto = 0,
        Manual = 1,
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum SweepMode: u8 {
        #[default]
        LinearOneWay = 1,
        LogOneWay = 2,
        LinearTwoWay = 3,
        LogTwoWay = 4,
    }
}

coded_enum! {
    /// Whether a sweep stops when a channel hits compliance, overflows, or oscillates.
    #[derive(Default)]
    pub enum Abort: u8 {
        #[default]
        Disabled = 1,
        Enabled = 2,
    }
}

coded_enum! {
    /// Output value held after a sweep completes.
    pub enum PostSweepCondition: u8 {
        Start = 1,
        Stop = 2,
    }
}

coded_enum! {
    pub enum AdcType: u8 {
        HighSpeed = 0,
        HighResolution = 1,
    }
}

coded_enum! {
    /// How the averaging sample count of the high-speed ADC is interpreted.
    #[derive(Default)]
    pub enum AveragingMode: u8 {
        #[default]
        Auto = 0,
        Manual = 1,
        PowerLineCycle = 2,
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum MeasurementMode: u8 {
        #[default]
        Spot = 1,
        StaircaseSweep = 2,
        PulsedSpot = 3,
        PulsedSweep = 4,
        StaircaseSweepWithPulsedBias = 5,
        QuasiPulsedSpot = 9,
        Sampling = 10,
        QuasiStaticCv = 13,
        LinearSearch = 14,
        BinarySearch = 15,
        MultiChannelSweep = 16,
        MultiChannelPulsedSpot = 27,
        MultiChannelPulsedSweep = 28,
    }
}

coded_enum! {
    /// Which side of the channel is measured (`CMM`).
    #[derive(Default)]
    pub enum OperationMode: u8 {
        #[default]
        ComplianceSide = 0,
        Current = 1,
        Voltage = 2,
        ForceSide = 3,
        ComplianceAndForceSide = 4,
    }
}

/// A physical channel, addressed by mainframe slot and sub-channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ChannelNumber {
    slot: u8,
    sub_channel: u8,
}

impl ChannelNumber {
    pub const SLOTS: u8 = 10;

    pub fn new(slot: u8, sub_channel: u8) -> Result<ChannelNumber> {
        if slot == 0 || slot > Self::SLOTS {
            return Err(Error::out_of_range("slot", slot))
        }
        if sub_channel == 0 || sub_channel > 2 {
            return Err(Error::out_of_range("sub-channel", sub_channel))
        }
        Ok(ChannelNumber { slot, sub_channel })
    }

    /// First sub-channel of `slot`.
    pub fn slot(slot: u8) -> Result<ChannelNumber> {
        Self::new(slot, 1)
    }

    pub fn slot_number(self) -> u8 {
        self.slot
    }

    pub fn sub_channel(self) -> u8 {
        self.sub_channel
    }

    pub fn code(self) -> u16 {
        match self.sub_channel {
            1 => self.slot as u16,
            sub_channel => self.slot as u16 * 100 + sub_channel as u16,
        }
    }

    pub fn from_code(code: u16) -> Result<ChannelNumber> {
        match code {
            1..=10 => Self::new(code as u8, 1),
            102..=1002 if code % 100 == 2 => Self::new((code / 100) as u8, 2),
            _ => Err(Error::out_of_range("channel", code)),
        }
    }
}

impl fmt::Debug for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SLOT_{:02}_CH{}", self.slot, self.sub_channel)
    }
}

impl fmt::Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl TryFrom<u16> for ChannelNumber {
    type Error = Error;

    fn try_from(code: u16) -> Result<ChannelNumber> {
        Self::from_code(code)
    }
}

impl From<ChannelNumber> for u16 {
    fn from(channel: ChannelNumber) -> u16 {
        channel.code()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_codes() {
        assert_eq!(ChannelNumber::slot(1).unwrap().code(), 1);
        assert_eq!(ChannelNumber::slot(10).unwrap().code(), 10);
        assert_eq!(ChannelNumber::new(1, 2).unwrap().code(), 102);
        assert_eq!(ChannelNumber::new(3, 2).unwrap().code(), 302);
        assert_eq!(ChannelNumber::new(10, 2).unwrap().code(), 1002);
    }

    #[test]
    fn test_channel_from_code() {
        assert_eq!(ChannelNumber::from_code(4).unwrap(), ChannelNumber::slot(4).unwrap());
        let channel = ChannelNumber::from_code(202).unwrap();
        assert_eq!(channel, ChannelNumber::new(2, 2).unwrap());
        assert_eq!((channel.slot_number(), channel.sub_channel()), (2, 2));
        let channel = ChannelNumber::from_code(7).unwrap();
        assert_eq!((channel.slot_number(), channel.sub_channel()), (7, 1));
        assert!(ChannelNumber::from_code(0).is_err());
        assert!(ChannelNumber::from_code(11).is_err());
        assert!(ChannelNumber::from_code(101).is_err());
        assert!(ChannelNumber::from_code(1102).is_err());
    }

    #[test]
    fn test_channel_bounds() {
        assert!(ChannelNumber::new(0, 1).is_err());
        assert!(ChannelNumber::new(11, 1).is_err());
        assert!(ChannelNumber::new(1, 3).is_err());
    }

    #[test]
    fn test_channel_debug() {
        assert_eq!(format!("{:?}", ChannelNumber::new(1, 2).unwrap()), "SLOT_01_CH2");
    }

    #[test]
    fn test_range_codes() {
        assert_eq!(VOutputRange::Min0V5.code(), 5);
        assert_eq!(VOutputRange::Min2V.code(), 20);
        assert_eq!(IOutputRange::Min10uA.code(), 15);
        assert_eq!(IMeasRange::Fix1A.code(), -20);
        assert_eq!(IMeasRange::from_code(-13).unwrap(), IMeasRange::Fix100nA);
        assert!(IMeasRange::from_code(7).is_err());
    }

    #[test]
    fn test_mode_from_integer() {
        assert_eq!(MeasurementMode::try_from(10).unwrap(), MeasurementMode::Sampling);
        assert_eq!(MeasurementMode::default(), MeasurementMode::Spot);
        assert!(MeasurementMode::try_from(6).is_err());
    }
}
