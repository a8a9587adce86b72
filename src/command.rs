//! Command definitions and their serialization.

use std::fmt;

use crate::ascii::format_float;
use crate::config::{MeasureRange, OutputRange, SourceConfig, TimingParameters};
use crate::params::{
    Abort, AdcType, AveragingMode, ChannelNumber, IMeasRange, MeasurementMode, OperationMode,
    PostSweepCondition, SweepMode, VOutputRange,
};
use crate::Quantity;

/// Learn query type for the measurement operation mode of all channels.
pub(crate) const LEARN_OPERATION_MODE: u8 = 46;
/// Learn query type for the measurement ranging status of all channels.
pub(crate) const LEARN_RANGING: u8 = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Force a voltage or current.
    ///
    /// Command: `DV|DI <ch>,<range>,<value>[,<compliance>[,<polarity>[,<compliance range>]]]`
    Force {
        channel: ChannelNumber,
        quantity: Quantity,
        value: f64,
        source: SourceConfig,
    },
    /// Spot measurement, answered with a status-prefixed float.
    ///
    /// Command: `TI <ch>[,<range>]` / `TV <ch>[,<range>]`
    Measure {
        channel: ChannelNumber,
        quantity: Quantity,
        range: Option<MeasureRange>,
    },
    /// Command: `MT <hold>,<delay>,<count>[,<step delay>]`
    TimingParameters(TimingParameters),
    /// Averaging of the high-speed ADC.
    ///
    /// Command: `AV <count>,<mode>`
    AverageSamples {
        count: i32,
        mode: AveragingMode,
    },
    /// Connect or disconnect the output filter of the listed channels, or of all channels.
    ///
    /// Command: `FL <0|1>[,<ch>...]`
    FilterConnection {
        enabled: bool,
        channels: Vec<ChannelNumber>,
    },
    /// Staircase sweep source setup.
    ///
    /// Command: `WV <ch>,<mode>,<range>,<start>,<stop>,<steps>,<current compliance>,<power compliance>`
    SweepSource {
        channel: ChannelNumber,
        mode: SweepMode,
        range: VOutputRange,
        start: f64,
        end: f64,
        steps: u32,
        current_compliance: f64,
        power_compliance: f64,
    },
    /// Command: `WT <hold>,<delay>,<step delay>,<trigger delay>,<measure delay>`
    SweepTiming {
        hold: f64,
        delay: f64,
        step_delay: f64,
        trigger_delay: f64,
        measure_delay: f64,
    },
    /// Command: `WM <abort>`
    SweepAutoAbort(Abort),
    /// Command: `WM <abort>,<post condition>`
    PostSweepCondition {
        abort: Abort,
        condition: PostSweepCondition,
    },
    /// Command: `AAD <ch>,<adc>`
    AdcType {
        channel: ChannelNumber,
        adc: AdcType,
    },
    /// Command: `MM <mode>,<ch>`
    MeasurementMode {
        mode: MeasurementMode,
        channel: ChannelNumber,
    },
    /// Command: `CMM <ch>,<mode>`
    OperationMode {
        channel: ChannelNumber,
        mode: OperationMode,
    },
    /// Command: `RI <ch>,<range>`
    CurrentMeasurementRange {
        channel: ChannelNumber,
        range: IMeasRange,
    },
    /// Report instrument settings of one category.
    ///
    /// Command: `*LRN? <type>`
    Learn(u8),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Force { channel, quantity, value, source } => {
                let mnemonic = match quantity {
                    Quantity::Voltage => "DV",
                    Quantity::Current => "DI",
                };
                write!(f, "{} {},{},{}", mnemonic, channel, source.output_range.code(),
                       format_float(*value))?;
                if let Some(compliance) = source.compliance {
                    write!(f, ",{}", format_float(compliance))?;
                    if let Some(polarity) = source.compliance_polarity {
                        write!(f, ",{}", polarity.code())?;
                        if let Some(range) = source.min_compliance_range {
                            write!(f, ",{}", range.code())?;
                        }
                    }
                }
                Ok(())
            }
            Self::Measure { channel, quantity, range } => {
                match quantity {
                    Quantity::Voltage => write!(f, "TV {}", channel)?,
                    Quantity::Current => write!(f, "TI {}", channel)?,
                }
                if let Some(range) = range {
                    write!(f, ",{}", range.code())?;
                }
                Ok(())
            }
            Self::TimingParameters(timing) => {
                write!(f, "MT {},{},{}", format_float(timing.hold), format_float(timing.delay),
                       timing.count)?;
                if let Some(step_delay) = timing.step_delay {
                    write!(f, ",{}", format_float(step_delay))?;
                }
                Ok(())
            }
            Self::AverageSamples { count, mode } =>
                write!(f, "AV {},{}", count, mode.code()),
            Self::FilterConnection { enabled, channels } => {
                write!(f, "FL {}", if *enabled { '1' } else { '0' })?;
                for channel in channels {
                    write!(f, ",{}", channel)?;
                }
                Ok(())
            }
            Self::SweepSource {
                channel, mode, range, start, end, steps, current_compliance, power_compliance
            } => write!(f, "WV {},{},{},{},{},{},{},{}", channel, mode.code(), range.code(),
                        format_float(*start), format_float(*end), steps,
                        format_float(*current_compliance), format_float(*power_compliance)),
            Self::SweepTiming { hold, delay, step_delay, trigger_delay, measure_delay } =>
                write!(f, "WT {},{},{},{},{}", format_float(*hold), format_float(*delay),
                       format_float(*step_delay), format_float(*trigger_delay),
                       format_float(*measure_delay)),
            Self::SweepAutoAbort(abort) =>
                write!(f, "WM {}", abort.code()),
            Self::PostSweepCondition { abort, condition } =>
                write!(f, "WM {},{}", abort.code(), condition.code()),
            Self::AdcType { channel, adc } =>
                write!(f, "AAD {},{}", channel, adc.code()),
            Self::MeasurementMode { mode, channel } =>
                write!(f, "MM {},{}", mode.code(), channel),
            Self::OperationMode { channel, mode } =>
                write!(f, "CMM {},{}", channel, mode.code()),
            Self::CurrentMeasurementRange { channel, range } =>
                write!(f, "RI {},{}", channel, range.code()),
            Self::Learn(kind) =>
                write!(f, "*LRN? {}", kind),
        }
    }
}

impl Command {
    /// Force command for `quantity` with automatic ranging and no compliance terms.
    pub(crate) fn force_default(channel: ChannelNumber, quantity: Quantity, value: f64) -> Command {
        let output_range = match quantity {
            Quantity::Voltage => OutputRange::Voltage(Default::default()),
            Quantity::Current => OutputRange::Current(Default::default()),
        };
        Command::Force { channel, quantity, value, source: SourceConfig::new(output_range) }
    }
}
