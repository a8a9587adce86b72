//! The instrument's ASCII number grammar.

use crate::{Error, Result};

/// Format `value` the way the instrument reads floats back most compactly.
///
/// The shortest digit string that round-trips is used. Values with a decimal exponent in
/// `-4..16` are written positionally and always carry a fractional part (`0.0`, `20.0`, `0.045`);
/// other values are written in scientific notation with a signed, two digit exponent (`1e-06`).
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value)
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0".to_owned() } else { "0.0".to_owned() }
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. `-4.312e1`
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent),
        None => return scientific,
    };
    let exponent = match exponent.parse::<i32>() {
        Ok(exponent) => exponent,
        Err(_) => return scientific,
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(mantissa) => ("-", mantissa),
        None => ("", mantissa),
    };

    let mut text = String::from(sign);
    if (-4..16).contains(&exponent) {
        let digits: String = mantissa.chars().filter(|&c| c != '.').collect();
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                text.push_str(&digits[..int_len]);
                text.push('.');
                text.push_str(&digits[int_len..]);
            } else {
                text.push_str(&digits);
                text.extend(std::iter::repeat('0').take(int_len - digits.len()));
                text.push_str(".0");
            }
        } else {
            text.push_str("0.");
            text.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            text.push_str(&digits);
        }
    } else {
        text.push_str(mantissa);
        text.push('e');
        text.push(if exponent < 0 { '-' } else { '+' });
        text.push_str(&format!("{:02}", exponent.abs()));
    }
    text
}

/// Reject values the number grammar cannot express (`NaN`, infinities) before they are sent.
pub(crate) fn check_finite(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::out_of_range(parameter, value))
    }
}

/// Meaning of the first character of a measurement response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementStatus {
    Normal,
    /// Another channel reached its compliance limit.
    OtherChannelCompliance,
    /// This channel reached its compliance limit.
    Compliance,
    OverRange,
    Oscillating,
    SearchTargetNotFound,
    SearchStopped,
    FirstSweepStep,
    LastSweepStep,
    Other(char),
}

impl MeasurementStatus {
    fn from_char(status: char) -> MeasurementStatus {
        match status {
            'N' => Self::Normal,
            'T' => Self::OtherChannelCompliance,
            'C' => Self::Compliance,
            'V' => Self::OverRange,
            'X' => Self::Oscillating,
            'G' => Self::SearchTargetNotFound,
            'S' => Self::SearchStopped,
            'W' => Self::FirstSweepStep,
            'E' => Self::LastSweepStep,
            other => Self::Other(other),
        }
    }

    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal | Self::FirstSweepStep | Self::LastSweepStep)
    }
}

/// A decoded measurement response such as `NAI+000.005E-06`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub status: MeasurementStatus,
    /// Channel letter, `A` for slot 1.
    pub channel: char,
    /// Measured quantity letter, `I` for current, `V` for voltage.
    pub quantity: char,
    pub value: f64,
}

/// Decode a measurement response: a 3-character prefix followed by a float and an optional
/// trailing carriage return.
pub fn parse_measurement(response: &str) -> Result<Measurement> {
    let body = response.trim_end_matches(['\r', '\n']);
    let mut prefix = body.chars();
    let (status, channel, quantity) = match (prefix.next(), prefix.next(), prefix.next()) {
        (Some(status), Some(channel), Some(quantity)) => (status, channel, quantity),
        _ => return Err(Error::parse(response, "shorter than the status prefix")),
    };
    let payload = prefix.as_str();
    if payload.is_empty() {
        return Err(Error::parse(response, "no value after the status prefix"))
    }
    let value = payload.parse::<f64>()
        .map_err(|error| Error::parse(response, format!("{:?} is not a number: {}", payload, error)))?;
    Ok(Measurement {
        status: MeasurementStatus::from_char(status),
        channel,
        quantity,
        value,
    })
}

/// Split a learn query answer like `CMM 1,0;CMM 2,3` into its `(channel, value)` code pairs,
/// keeping only entries for `mnemonic`.
pub(crate) fn parse_learn_response(mnemonic: &str, response: &str) -> Result<Vec<(u16, i32)>> {
    let mut pairs = Vec::new();
    for entry in response.trim_end_matches(['\r', '\n']).split(';') {
        let entry = entry.trim();
        let arguments = match entry.split_once(' ') {
            Some((name, arguments)) if name == mnemonic => arguments,
            _ => continue,
        };
        let (channel, value) = arguments.split_once(',')
            .ok_or_else(|| Error::parse(response, format!("{:?} has no value field", entry)))?;
        let channel = channel.trim().parse::<u16>()
            .map_err(|_| Error::parse(response, format!("{:?} is not a channel", channel)))?;
        let value = value.trim().parse::<i32>()
            .map_err(|_| Error::parse(response, format!("{:?} is not a code", value)))?;
        pairs.push((channel, value));
    }
    if pairs.is_empty() {
        return Err(Error::parse(response, format!("no {} entries", mnemonic)))
    }
    Ok(pairs)
}
