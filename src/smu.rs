use crate::{Error, Quantity, Result, Transport};
use crate::ascii::{check_finite, parse_learn_response, parse_measurement, Measurement};
use crate::command::{Command, LEARN_OPERATION_MODE, LEARN_RANGING};
use crate::config::{InitialValues, MeasureConfig, SourceConfig, TimingParameters};
use crate::params::{
    AdcType, AveragingMode, ChannelNumber, IMeasRange, MeasurementMode, OperationMode,
};
use crate::sweep::{IvSweep, SweepState};

/// Controller for one source-measurement unit channel.
///
/// Configuration set through this handle is cached and combined into the command sent by the
/// next operation that needs it. Every operation performs at most one `write` or `ask`.
#[derive(Debug)]
pub struct Smu<T: Transport> {
    transport: T,
    channel: ChannelNumber,
    source_config: Option<SourceConfig>,
    measure_config: Option<MeasureConfig>,
    timing_parameters: Option<TimingParameters>,
    measurement_mode: MeasurementMode,
    pub(crate) sweep: SweepState,
}

impl<T: Transport> Smu<T> {
    pub fn new(transport: T, channel: ChannelNumber) -> Smu<T> {
        Smu {
            transport,
            channel,
            source_config: None,
            measure_config: None,
            timing_parameters: None,
            measurement_mode: Default::default(),
            sweep: Default::default(),
        }
    }

    pub fn channel(&self) -> ChannelNumber {
        self.channel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Replace the source configuration. Nothing is sent until the next force operation.
    pub fn set_source_config(&mut self, config: SourceConfig) {
        log::debug!("set_source_config({:?})", config);
        self.source_config = Some(config);
    }

    pub fn source_config(&self) -> Option<SourceConfig> {
        self.source_config
    }

    /// Replace the measurement configuration. Nothing is sent.
    pub fn set_measure_config(&mut self, config: MeasureConfig) {
        log::debug!("set_measure_config({:?})", config);
        self.measure_config = Some(config);
    }

    pub fn measure_config(&self) -> Option<MeasureConfig> {
        self.measure_config
    }

    pub fn timing_parameters(&self) -> Option<TimingParameters> {
        self.timing_parameters
    }

    pub fn force_voltage(&mut self, volts: f64) -> Result<()> {
        log::debug!("force_voltage({:?})", volts);
        self.force(Quantity::Voltage, volts)
    }

    pub fn force_current(&mut self, amperes: f64) -> Result<()> {
        log::debug!("force_current({:?})", amperes);
        self.force(Quantity::Current, amperes)
    }

    fn force(&mut self, quantity: Quantity, value: f64) -> Result<()> {
        check_finite("forced value", value)?;
        let command = match self.source_config {
            Some(source) if source.output_range.quantity() != quantity =>
                return Err(Error::ConfigMismatch {
                    requested: quantity,
                    configured: source.output_range.quantity(),
                }),
            Some(source) => {
                if let Some(compliance) = source.compliance {
                    check_finite("compliance", compliance)?;
                }
                Command::Force { channel: self.channel, quantity, value, source }
            }
            None =>
                Command::force_default(self.channel, quantity, value),
        };
        self.send(&command)
    }

    pub fn measure_current(&mut self) -> Result<f64> {
        Ok(self.measure(Quantity::Current)?.value)
    }

    pub fn measure_voltage(&mut self) -> Result<f64> {
        Ok(self.measure(Quantity::Voltage)?.value)
    }

    /// Take a spot measurement of `quantity` and return the decoded response, status included.
    ///
    /// The range of the measure configuration is sent along; it must be a range of `quantity`.
    pub fn measure(&mut self, quantity: Quantity) -> Result<Measurement> {
        let range = match self.measure_config {
            Some(config) if config.measure_range.quantity() != quantity =>
                return Err(Error::MeasureConfigMismatch {
                    requested: quantity,
                    configured: config.measure_range.quantity(),
                }),
            Some(config) => Some(config.measure_range),
            None => None,
        };
        let response = self.ask(&Command::Measure { channel: self.channel, quantity, range })?;
        let measurement = parse_measurement(&response)?;
        if !measurement.status.is_normal() {
            log::warn!("channel {:?} measured {} with status {:?}",
                       self.channel, measurement.value, measurement.status);
        }
        log::debug!("measure({:?}) = {:?}", quantity, measurement.value);
        Ok(measurement)
    }

    pub fn set_timing_parameters(&mut self, hold: f64, delay: f64, count: u32,
                                 step_delay: Option<f64>) -> Result<()> {
        log::debug!("set_timing_parameters({:?}, {:?}, {:?}, {:?})", hold, delay, count, step_delay);
        let timing = TimingParameters::new(hold, delay, count, step_delay)?;
        self.timing_parameters = Some(timing);
        self.send(&Command::TimingParameters(timing))
    }

    /// Set the number of averaged samples of the high-speed ADC, in automatic mode.
    pub fn set_average_samples(&mut self, count: i32) -> Result<()> {
        self.set_average_samples_with_mode(count, AveragingMode::Auto)
    }

    pub fn set_average_samples_with_mode(&mut self, count: i32, mode: AveragingMode) -> Result<()> {
        log::debug!("set_average_samples({:?}, {:?})", count, mode);
        self.send(&Command::AverageSamples { count, mode })
    }

    /// Connect or disconnect the output filter of `channels`, in the given order, or of every
    /// channel if `channels` is empty.
    pub fn set_filter_connection(&mut self, enabled: bool, channels: &[ChannelNumber]) -> Result<()> {
        log::debug!("set_filter_connection({:?}, {:?})", enabled, channels);
        self.send(&Command::FilterConnection { enabled, channels: channels.to_vec() })
    }

    pub fn use_high_speed_adc(&mut self) -> Result<()> {
        self.set_adc_type(AdcType::HighSpeed)
    }

    pub fn use_high_resolution_adc(&mut self) -> Result<()> {
        self.set_adc_type(AdcType::HighResolution)
    }

    fn set_adc_type(&mut self, adc: AdcType) -> Result<()> {
        log::debug!("set_adc_type({:?})", adc);
        self.send(&Command::AdcType { channel: self.channel, adc })
    }

    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) -> Result<()> {
        log::debug!("set_measurement_mode({:?})", mode);
        self.measurement_mode = mode;
        self.send(&Command::MeasurementMode { mode, channel: self.channel })
    }

    /// The measurement mode last requested through this handle, whether or not it was delivered;
    /// the instrument is not queried.
    pub fn measurement_mode(&self) -> MeasurementMode {
        self.measurement_mode
    }

    pub fn set_measurement_operation_mode(&mut self, mode: OperationMode) -> Result<()> {
        log::debug!("set_measurement_operation_mode({:?})", mode);
        self.send(&Command::OperationMode { channel: self.channel, mode })
    }

    /// Query the measurement operation mode of every channel that reports one.
    pub fn measurement_operation_mode(&mut self) -> Result<Vec<(ChannelNumber, OperationMode)>> {
        let response = self.ask(&Command::Learn(LEARN_OPERATION_MODE))?;
        parse_learn_response("CMM", &response)?
            .into_iter()
            .map(|(channel, mode)| {
                let mode = u8::try_from(mode)
                    .map_err(|_| Error::parse(&response, format!("{} is not a mode", mode)))?;
                Ok((ChannelNumber::from_code(channel)?, OperationMode::from_code(mode)?))
            })
            .collect()
    }

    pub fn set_current_measurement_range(&mut self, range: IMeasRange) -> Result<()> {
        log::debug!("set_current_measurement_range({:?})", range);
        self.send(&Command::CurrentMeasurementRange { channel: self.channel, range })
    }

    /// Query the current measurement range of every channel that reports one.
    pub fn current_measurement_range(&mut self) -> Result<Vec<(ChannelNumber, IMeasRange)>> {
        let response = self.ask(&Command::Learn(LEARN_RANGING))?;
        parse_learn_response("RI", &response)?
            .into_iter()
            .map(|(channel, range)| Ok((ChannelNumber::from_code(channel)?, IMeasRange::from_code(range)?)))
            .collect()
    }

    pub fn iv_sweep(&mut self) -> IvSweep<'_, T> {
        IvSweep::new(self)
    }

    /// Apply the values given in a group configuration, in a fixed order.
    pub fn apply(&mut self, initial: &InitialValues) -> Result<()> {
        log::debug!("apply({:?})", initial);
        if let Some(adc) = initial.adc_type {
            self.set_adc_type(adc)?;
        }
        if let Some(mode) = initial.measurement_mode {
            self.set_measurement_mode(mode)?;
        }
        if let Some(timing) = initial.timing_parameters {
            self.set_timing_parameters(timing.hold, timing.delay, timing.count, timing.step_delay)?;
        }
        if let Some((count, mode)) = initial.average_samples {
            self.set_average_samples_with_mode(count, mode)?;
        }
        Ok(())
    }

    /// Send an arbitrary command, bypassing the cached configuration.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let command = command.to_string();
        log::trace!("write({:?})", command);
        self.transport.write(&command)
    }

    fn ask(&mut self, command: &Command) -> Result<String> {
        let command = command.to_string();
        let response = self.transport.ask(&command)?;
        log::trace!("ask({:?}) = {:?}", command, response);
        Ok(response)
    }
}
