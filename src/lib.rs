mod sys;
mod params;
mod config;
mod ascii;
mod command;
mod smu;
mod sweep;
mod group;

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Asking to force {requested}, but source_config contains a {configured} output range")]
    ConfigMismatch {
        requested: Quantity,
        configured: Quantity,
    },
    #[error("Asking to measure {requested}, but measure_config contains a {configured} measure range")]
    MeasureConfigMismatch {
        requested: Quantity,
        configured: Quantity,
    },
    #[error("cannot parse response {response:?}: {reason}")]
    ResponseParse {
        response: String,
        reason: String,
    },
    #[error("transport I/O error: {0}")]
    Transport(#[source] io::Error),
    #[error("{parameter} out of range: {value}")]
    OutOfRange {
        parameter: &'static str,
        value: String,
    },
    #[error("no driver registered as {0:?}")]
    UnknownDriver(String),
    #[error("invalid group configuration: {0}")]
    Configuration(#[from] serde_json::Error),
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Sync + Send + 'static>),
}

impl Error {
    pub(crate) fn parse(response: &str, reason: impl Into<String>) -> Error {
        Error::ResponseParse { response: response.to_owned(), reason: reason.into() }
    }

    pub(crate) fn out_of_range(parameter: &'static str, value: impl std::fmt::Display) -> Error {
        Error::OutOfRange { parameter, value: value.to_string() }
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Transport(io_error) =>
                io_error,
            Error::Other(error) => {
                match error.downcast::<io::Error>() {
                    Ok(error) => *error,
                    Err(error) => io::Error::new(io::ErrorKind::Other, error)
                }
            }
            error @ (Error::ResponseParse { .. } | Error::Configuration(_)) =>
                io::Error::new(io::ErrorKind::InvalidData, error),
            error =>
                io::Error::new(io::ErrorKind::InvalidInput, error),
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        match error.downcast::<Self>() {
            Ok(error) => error,
            Err(error) => Error::Transport(error),
        }
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

/// The physical quantity a channel forces or measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
    Current,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Voltage => write!(f, "voltage"),
            Self::Current => write!(f, "current"),
        }
    }
}

pub use sys::{
    Transport,
    LoopbackTransport,
};

#[cfg(feature = "socket")]
pub use sys::SocketTransport;

pub use params::{
    ChannelNumber,
    VOutputRange,
    IOutputRange,
    VMeasRange,
    IMeasRange,
    CompliancePolarity,
    SweepMode,
    Abort,
    PostSweepCondition,
    AdcType,
    AveragingMode,
    MeasurementMode,
    OperationMode,
};

pub use config::{
    OutputRange,
    MeasureRange,
    SourceConfig,
    MeasureConfig,
    TimingParameters,
    InitialValues,
    SubmoduleConfiguration,
    GroupConfiguration,
};

pub use ascii::{
    format_float,
    parse_measurement,
    Measurement,
    MeasurementStatus,
};

pub use command::Command;

pub use smu::Smu;

pub use sweep::{
    SweepState,
    IvSweep,
};

pub use group::{
    Constructor,
    Registry,
    Submodule,
    InstrumentGroup,
};
