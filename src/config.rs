//! High-level configuration of a channel and of a group of channels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Quantity, Result};
use crate::ascii::check_finite;
use crate::params::{
    AdcType, AveragingMode, ChannelNumber, CompliancePolarity, IMeasRange, IOutputRange,
    MeasurementMode, VMeasRange, VOutputRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputRange {
    Voltage(VOutputRange),
    Current(IOutputRange),
}

impl OutputRange {
    pub fn quantity(self) -> Quantity {
        match self {
            Self::Voltage(_) => Quantity::Voltage,
            Self::Current(_) => Quantity::Current,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Voltage(range) => range.code(),
            Self::Current(range) => range.code(),
        }
    }
}

impl From<VOutputRange> for OutputRange {
    fn from(range: VOutputRange) -> Self {
        Self::Voltage(range)
    }
}

impl From<IOutputRange> for OutputRange {
    fn from(range: IOutputRange) -> Self {
        Self::Current(range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureRange {
    Voltage(VMeasRange),
    Current(IMeasRange),
}

impl MeasureRange {
    pub fn quantity(self) -> Quantity {
        match self {
            Self::Voltage(_) => Quantity::Voltage,
            Self::Current(_) => Quantity::Current,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Voltage(range) => range.code(),
            Self::Current(range) => range.code(),
        }
    }
}

impl From<VMeasRange> for MeasureRange {
    fn from(range: VMeasRange) -> Self {
        Self::Voltage(range)
    }
}

impl From<IMeasRange> for MeasureRange {
    fn from(range: IMeasRange) -> Self {
        Self::Current(range)
    }
}

/// What the channel forces and how the complementary quantity is limited.
///
/// The optional terms are encoded in order, and each is only sent if all terms before it are
/// present: a polarity without a compliance value is never sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub output_range: OutputRange,
    pub compliance: Option<f64>,
    pub compliance_polarity: Option<CompliancePolarity>,
    pub min_compliance_range: Option<OutputRange>,
}

impl SourceConfig {
    /// Source configuration with only an output range and no compliance terms.
    pub fn new(output_range: impl Into<OutputRange>) -> SourceConfig {
        SourceConfig {
            output_range: output_range.into(),
            compliance: None,
            compliance_polarity: None,
            min_compliance_range: None,
        }
    }

    pub fn with_compliance(self, compliance: f64) -> SourceConfig {
        SourceConfig { compliance: Some(compliance), ..self }
    }

    pub fn with_compliance_polarity(self, polarity: CompliancePolarity) -> SourceConfig {
        SourceConfig { compliance_polarity: Some(polarity), ..self }
    }

    pub fn with_min_compliance_range(self, range: impl Into<OutputRange>) -> SourceConfig {
        SourceConfig { min_compliance_range: Some(range.into()), ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureConfig {
    pub measure_range: MeasureRange,
}

impl MeasureConfig {
    pub fn new(measure_range: impl Into<MeasureRange>) -> MeasureConfig {
        MeasureConfig { measure_range: measure_range.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingParameters {
    /// Seconds between the start of the measurement and the first sample.
    pub hold: f64,
    /// Seconds between samples.
    pub delay: f64,
    /// Number of samples.
    pub count: u32,
    pub step_delay: Option<f64>,
}

impl TimingParameters {
    pub fn new(hold: f64, delay: f64, count: u32, step_delay: Option<f64>) -> Result<TimingParameters> {
        check_finite("hold", hold)?;
        check_finite("delay", delay)?;
        if let Some(step_delay) = step_delay {
            if !(step_delay >= 0.0) {
                return Err(Error::out_of_range("step delay", step_delay))
            }
        }
        Ok(TimingParameters { hold, delay, count, step_delay })
    }
}

/// Values applied to a channel once, right after it has been constructed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialValues {
    pub adc_type: Option<AdcType>,
    pub measurement_mode: Option<MeasurementMode>,
    pub timing_parameters: Option<TimingParameters>,
    pub average_samples: Option<(i32, AveragingMode)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmoduleConfiguration {
    /// Identifier of the driver in the registry, e.g. `"B1517A"`.
    #[serde(rename = "type")]
    pub driver: String,
    pub channel: ChannelNumber,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfiguration {
    pub submodules: BTreeMap<String, SubmoduleConfiguration>,
    pub initial_values: BTreeMap<String, InitialValues>,
    pub set_initial_values_on_load: bool,
}

impl GroupConfiguration {
    pub fn from_json(text: &str) -> Result<GroupConfiguration> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_range_kind() {
        assert_eq!(OutputRange::from(VOutputRange::Auto).quantity(), Quantity::Voltage);
        assert_eq!(OutputRange::from(IOutputRange::Min10uA).quantity(), Quantity::Current);
        assert_eq!(OutputRange::from(IOutputRange::Min10uA).code(), 15);
    }

    #[test]
    fn test_source_config_builder() {
        let config = SourceConfig::new(VOutputRange::Auto)
            .with_compliance(1e-6)
            .with_compliance_polarity(CompliancePolarity::Auto)
            .with_min_compliance_range(IOutputRange::Min10uA);
        assert_eq!(config.compliance, Some(1e-6));
        assert_eq!(config.compliance_polarity, Some(CompliancePolarity::Auto));
        assert_eq!(config.min_compliance_range, Some(OutputRange::Current(IOutputRange::Min10uA)));
    }

    #[test]
    fn test_negative_step_delay() {
        assert!(TimingParameters::new(0.0, 0.1, 1, Some(0.0)).is_ok());
        assert!(matches!(TimingParameters::new(0.0, 0.1, 1, Some(-0.5)),
                         Err(Error::OutOfRange { .. })));
        assert!(TimingParameters::new(0.0, 0.1, 1, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_non_finite_timing() {
        assert!(matches!(TimingParameters::new(f64::NAN, 0.1, 1, None),
                         Err(Error::OutOfRange { parameter: "hold", .. })));
        assert!(matches!(TimingParameters::new(0.0, f64::INFINITY, 1, None),
                         Err(Error::OutOfRange { parameter: "delay", .. })));
        assert!(TimingParameters::new(0.0, 0.1, 1, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_group_from_json() {
        let config = GroupConfiguration::from_json(r#"{
            "submodules": {
                "gate": { "type": "B1517A", "channel": 1 },
                "drain": { "type": "B1511B", "channel": 302 }
            },
            "initial_values": {
                "gate": { "adc_type": "HighResolution", "average_samples": [10, "Manual"] }
            },
            "set_initial_values_on_load": true
        }"#).unwrap();
        assert_eq!(config.submodules.len(), 2);
        assert_eq!(config.submodules["drain"].channel, ChannelNumber::new(3, 2).unwrap());
        assert_eq!(config.initial_values["gate"].adc_type, Some(AdcType::HighResolution));
        assert_eq!(config.initial_values["gate"].average_samples, Some((10, AveragingMode::Manual)));
        assert!(config.set_initial_values_on_load);
    }

    #[test]
    fn test_group_bad_channel() {
        let result = GroupConfiguration::from_json(r#"{
            "submodules": { "gate": { "type": "B1517A", "channel": 12 } }
        }"#);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
