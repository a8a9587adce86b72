//! Staircase IV sweep setup of a channel.
//!
//! The instrument has no command to update a single sweep field, so every setter re-sends the
//! whole `WV` or `WT` command with all fields at their latest values. A value is checked before
//! it is stored, and once stored it stays cached even if sending it fails.

use crate::{Result, Transport};
use crate::ascii::check_finite;
use crate::command::Command;
use crate::params::{Abort, ChannelNumber, PostSweepCondition, SweepMode, VOutputRange};
use crate::smu::Smu;

const DEFAULT_CURRENT_COMPLIANCE: f64 = 0.1;
const DEFAULT_POWER_COMPLIANCE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepState {
    pub mode: SweepMode,
    pub range: VOutputRange,
    pub start: f64,
    pub end: f64,
    pub steps: u32,
    pub current_compliance: Option<f64>,
    pub power_compliance: Option<f64>,
    pub hold_time: f64,
    pub delay: f64,
    pub step_delay: f64,
    pub trigger_delay: f64,
    pub measure_delay: f64,
}

impl Default for SweepState {
    fn default() -> Self {
        SweepState {
            mode: Default::default(),
            range: Default::default(),
            start: 0.0,
            end: 0.0,
            steps: 1,
            current_compliance: None,
            power_compliance: None,
            hold_time: 0.0,
            delay: 0.0,
            step_delay: 0.0,
            trigger_delay: 0.0,
            measure_delay: 0.0,
        }
    }
}

impl SweepState {
    pub fn source_command(&self, channel: ChannelNumber) -> Command {
        Command::SweepSource {
            channel,
            mode: self.mode,
            range: self.range,
            start: self.start,
            end: self.end,
            steps: self.steps,
            current_compliance: self.current_compliance.unwrap_or(DEFAULT_CURRENT_COMPLIANCE),
            power_compliance: self.power_compliance.unwrap_or(DEFAULT_POWER_COMPLIANCE),
        }
    }

    pub fn timing_command(&self) -> Command {
        Command::SweepTiming {
            hold: self.hold_time,
            delay: self.delay,
            step_delay: self.step_delay,
            trigger_delay: self.trigger_delay,
            measure_delay: self.measure_delay,
        }
    }
}

/// Sweep setup of one channel, borrowed from its [`Smu`].
#[derive(Debug)]
pub struct IvSweep<'a, T: Transport> {
    smu: &'a mut Smu<T>,
}

macro_rules! source_setter {
    ($name:ident, $field:ident: Option<f64>) => {
        pub fn $name(&mut self, value: f64) -> Result<()> {
            log::debug!(concat!(stringify!($name), "({:?})"), value);
            self.smu.sweep.$field = Some(check_finite(stringify!($field), value)?);
            self.send_source()
        }
    };
    ($name:ident, $field:ident: f64) => {
        pub fn $name(&mut self, value: f64) -> Result<()> {
            log::debug!(concat!(stringify!($name), "({:?})"), value);
            self.smu.sweep.$field = check_finite(stringify!($field), value)?;
            self.send_source()
        }
    };
    ($name:ident, $field:ident: $ty:ty) => {
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            log::debug!(concat!(stringify!($name), "({:?})"), value);
            self.smu.sweep.$field = value;
            self.send_source()
        }
    };
}

macro_rules! timing_setter {
    ($name:ident, $field:ident) => {
        pub fn $name(&mut self, seconds: f64) -> Result<()> {
            log::debug!(concat!(stringify!($name), "({:?})"), seconds);
            self.smu.sweep.$field = check_finite(stringify!($field), seconds)?;
            self.send_timing()
        }
    };
}

impl<'a, T: Transport> IvSweep<'a, T> {
    pub(crate) fn new(smu: &'a mut Smu<T>) -> Self {
        IvSweep { smu }
    }

    pub fn state(&self) -> &SweepState {
        &self.smu.sweep
    }

    source_setter!(sweep_mode, mode: SweepMode);
    source_setter!(sweep_range, range: VOutputRange);
    source_setter!(sweep_start, start: f64);
    source_setter!(sweep_end, end: f64);
    source_setter!(sweep_steps, steps: u32);
    source_setter!(current_compliance, current_compliance: Option<f64>);
    source_setter!(power_compliance, power_compliance: Option<f64>);

    timing_setter!(hold_time, hold_time);
    timing_setter!(delay, delay);
    timing_setter!(step_delay, step_delay);
    timing_setter!(trigger_delay, trigger_delay);
    timing_setter!(measure_delay, measure_delay);

    /// Send `WM <abort>`. Not remembered; unrelated to [`Self::post_sweep_voltage_condition`].
    pub fn sweep_auto_abort(&mut self, abort: Abort) -> Result<()> {
        log::debug!("sweep_auto_abort({:?})", abort);
        self.smu.send(&Command::SweepAutoAbort(abort))
    }

    /// Send `WM 2,<condition>`, i.e. with automatic abort enabled.
    pub fn post_sweep_voltage_condition(&mut self, condition: PostSweepCondition) -> Result<()> {
        log::debug!("post_sweep_voltage_condition({:?})", condition);
        self.smu.send(&Command::PostSweepCondition { abort: Abort::Enabled, condition })
    }

    fn send_source(&mut self) -> Result<()> {
        let command = self.smu.sweep.source_command(self.smu.channel());
        self.smu.send(&command)
    }

    fn send_timing(&mut self) -> Result<()> {
        let command = self.smu.sweep.timing_command();
        self.smu.send(&command)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::LoopbackTransport;

    fn smu() -> Smu<LoopbackTransport> {
        Smu::new(LoopbackTransport::new(), ChannelNumber::slot(1).unwrap())
    }

    #[test]
    fn test_source_progression() {
        let mut smu = smu();
        {
            let mut sweep = smu.iv_sweep();
            sweep.sweep_mode(SweepMode::LinearTwoWay).unwrap();
            sweep.sweep_range(VOutputRange::Min2V).unwrap();
            sweep.sweep_start(0.2).unwrap();
            sweep.sweep_end(12.3).unwrap();
            sweep.sweep_steps(13).unwrap();
            sweep.current_compliance(45e-3).unwrap();
            sweep.power_compliance(0.2).unwrap();
        }
        assert_eq!(smu.transport().written(), [
            "WV 1,3,0,0.0,0.0,1,0.1,0.0",
            "WV 1,3,20,0.0,0.0,1,0.1,0.0",
            "WV 1,3,20,0.2,0.0,1,0.1,0.0",
            "WV 1,3,20,0.2,12.3,1,0.1,0.0",
            "WV 1,3,20,0.2,12.3,13,0.1,0.0",
            "WV 1,3,20,0.2,12.3,13,0.045,0.0",
            "WV 1,3,20,0.2,12.3,13,0.045,0.2",
        ]);
    }

    #[test]
    fn test_timing_progression() {
        let mut smu = smu();
        {
            let mut sweep = smu.iv_sweep();
            sweep.hold_time(43.12).unwrap();
            sweep.delay(34.01).unwrap();
            sweep.step_delay(0.01).unwrap();
            sweep.trigger_delay(0.1).unwrap();
            sweep.measure_delay(15.4).unwrap();
        }
        assert_eq!(smu.transport().written(), [
            "WT 43.12,0.0,0.0,0.0,0.0",
            "WT 43.12,34.01,0.0,0.0,0.0",
            "WT 43.12,34.01,0.01,0.0,0.0",
            "WT 43.12,34.01,0.01,0.1,0.0",
            "WT 43.12,34.01,0.01,0.1,15.4",
        ]);
    }

    #[test]
    fn test_timing_does_not_touch_source() {
        let mut smu = smu();
        smu.iv_sweep().sweep_start(1.5).unwrap();
        smu.iv_sweep().hold_time(2.0).unwrap();
        smu.iv_sweep().sweep_end(3.0).unwrap();
        assert_eq!(smu.transport().written(), [
            "WV 1,1,0,1.5,0.0,1,0.1,0.0",
            "WT 2.0,0.0,0.0,0.0,0.0",
            "WV 1,1,0,1.5,3.0,1,0.1,0.0",
        ]);
    }

    #[test]
    fn test_repeat_is_identical() {
        let mut smu = smu();
        smu.iv_sweep().sweep_steps(5).unwrap();
        smu.iv_sweep().sweep_steps(5).unwrap();
        let written = smu.transport().written();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], written[1]);
    }

    #[test]
    fn test_sweep_auto_abort() {
        let mut smu = smu();
        smu.iv_sweep().sweep_auto_abort(Abort::Enabled).unwrap();
        assert_eq!(smu.transport().written(), ["WM 2"]);
    }

    #[test]
    fn test_post_sweep_voltage_condition() {
        let mut smu = smu();
        smu.iv_sweep().post_sweep_voltage_condition(PostSweepCondition::Stop).unwrap();
        assert_eq!(smu.transport().written(), ["WM 2,2"]);
    }

    #[test]
    fn test_wm_forms_are_independent() {
        let mut smu = smu();
        smu.iv_sweep().sweep_auto_abort(Abort::Disabled).unwrap();
        smu.iv_sweep().post_sweep_voltage_condition(PostSweepCondition::Start).unwrap();
        smu.iv_sweep().sweep_auto_abort(Abort::Disabled).unwrap();
        assert_eq!(smu.transport().written(), ["WM 1", "WM 2,1", "WM 1"]);
    }

    #[test]
    fn test_non_finite_values_are_not_sent() {
        let mut smu = smu();
        {
            let mut sweep = smu.iv_sweep();
            assert!(matches!(sweep.sweep_start(f64::NEG_INFINITY),
                             Err(crate::Error::OutOfRange { parameter: "start", .. })));
            assert!(sweep.sweep_end(f64::NAN).is_err());
            assert!(sweep.current_compliance(f64::INFINITY).is_err());
            assert!(sweep.power_compliance(f64::NAN).is_err());
            assert!(sweep.hold_time(f64::NAN).is_err());
            assert!(sweep.measure_delay(f64::INFINITY).is_err());
            assert_eq!(*sweep.state(), SweepState::default());
        }
        assert!(smu.transport().written().is_empty());
    }

    #[test]
    fn test_state_tracks_failed_sends() {
        let mut smu = smu();
        smu.transport_mut().fail(std::io::ErrorKind::BrokenPipe);
        assert!(smu.iv_sweep().sweep_end(4.0).is_err());
        smu.transport_mut().heal();
        smu.iv_sweep().sweep_steps(2).unwrap();
        assert_eq!(smu.iv_sweep().state().end, 4.0);
        assert_eq!(smu.transport().written(), ["WV 1,1,0,0.0,4.0,2,0.1,0.0"]);
    }
}
