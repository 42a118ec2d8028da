//! Discrete settings of the SR830 and the tables that map them to instrument indices.

use std::fmt::Display;

use scpi_endpoint::EndpointError;

/// Full scale sensitivities in volts, indexed by the value of the `SENS` command.
pub const SENSITIVITIES: [f64; 27] = [
    2e-9, 5e-9, 10e-9, 20e-9, 50e-9, 100e-9, 200e-9, 500e-9, 1e-6, 2e-6, 5e-6, 10e-6, 20e-6, 50e-6,
    100e-6, 200e-6, 500e-6, 1e-3, 2e-3, 5e-3, 10e-3, 20e-3, 50e-3, 100e-3, 200e-3, 500e-3, 1.0,
];

/// Time constants in seconds, indexed by the value of the `OFLT` command.
pub const TIME_CONSTANTS: [f64; 20] = [
    10e-6, 30e-6, 100e-6, 300e-6, 1e-3, 3e-3, 10e-3, 30e-3, 100e-3, 300e-3, 1.0, 3.0, 10.0, 30.0,
    100.0, 300.0, 1e3, 3e3, 10e3, 30e3,
];

/// Find the index of `value` in one of the tables above.
///
/// Values must match a table entry to within a relative deviation of 1e-6.
pub(crate) fn table_index(table: &[f64], value: f64, what: &str) -> Result<usize, EndpointError> {
    table
        .iter()
        .position(|entry| (entry - value).abs() <= 1e-6 * entry)
        .ok_or_else(|| {
            EndpointError::InvalidArgument(format!(
                "{value} is not a valid {what}. Allowed values are: {table:?}"
            ))
        })
}

/// Look up the table entry for an index returned by the instrument.
pub(crate) fn table_value(table: &[f64], response: &str) -> Result<f64, EndpointError> {
    response
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|idx| table.get(idx).copied())
        .ok_or_else(|| EndpointError::ResponseParseError(response.to_string()))
}

/// Source of the reference signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// External reference input.
    External,
    /// Internal oscillator.
    #[default]
    Internal,
}

impl ReferenceSource {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            ReferenceSource::External => "0",
            ReferenceSource::Internal => "1",
        }
    }

    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, EndpointError> {
        match value.trim() {
            "0" => Ok(ReferenceSource::External),
            "1" => Ok(ReferenceSource::Internal),
            _ => Err(EndpointError::ResponseParseError(value.to_string())),
        }
    }
}

impl Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceSource::External => write!(f, "external"),
            ReferenceSource::Internal => write!(f, "internal"),
        }
    }
}

/// Configuration of the signal input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputConfig {
    /// Single ended voltage on input A.
    #[default]
    A,
    /// Differential voltage between inputs A and B.
    AMinusB,
    /// Current input with 1 MOhm gain.
    Current1M,
    /// Current input with 100 MOhm gain.
    Current100M,
}

impl InputConfig {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            InputConfig::A => "0",
            InputConfig::AMinusB => "1",
            InputConfig::Current1M => "2",
            InputConfig::Current100M => "3",
        }
    }

    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, EndpointError> {
        match value.trim() {
            "0" => Ok(InputConfig::A),
            "1" => Ok(InputConfig::AMinusB),
            "2" => Ok(InputConfig::Current1M),
            "3" => Ok(InputConfig::Current100M),
            _ => Err(EndpointError::ResponseParseError(value.to_string())),
        }
    }
}

impl Display for InputConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputConfig::A => write!(f, "a"),
            InputConfig::AMinusB => write!(f, "a-b"),
            InputConfig::Current1M => write!(f, "I 1M"),
            InputConfig::Current100M => write!(f, "I 100M"),
        }
    }
}

/// Coupling of the signal input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputCoupling {
    /// AC coupled.
    #[default]
    Ac,
    /// DC coupled.
    Dc,
}

impl InputCoupling {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            InputCoupling::Ac => "0",
            InputCoupling::Dc => "1",
        }
    }

    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, EndpointError> {
        match value.trim() {
            "0" => Ok(InputCoupling::Ac),
            "1" => Ok(InputCoupling::Dc),
            _ => Err(EndpointError::ResponseParseError(value.to_string())),
        }
    }
}

impl Display for InputCoupling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputCoupling::Ac => write!(f, "AC"),
            InputCoupling::Dc => write!(f, "DC"),
        }
    }
}

/// What the SR830 locks to when the reference is external.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSlope {
    /// Zero crossing of a sine.
    #[default]
    Sine,
    /// Rising edge of a TTL signal.
    TtlRising,
    /// Falling edge of a TTL signal.
    TtlFalling,
}

impl TriggerSlope {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            TriggerSlope::Sine => "0",
            TriggerSlope::TtlRising => "1",
            TriggerSlope::TtlFalling => "2",
        }
    }

    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, EndpointError> {
        match value.trim() {
            "0" => Ok(TriggerSlope::Sine),
            "1" => Ok(TriggerSlope::TtlRising),
            "2" => Ok(TriggerSlope::TtlFalling),
            _ => Err(EndpointError::ResponseParseError(value.to_string())),
        }
    }
}

impl Display for TriggerSlope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerSlope::Sine => write!(f, "sine"),
            TriggerSlope::TtlRising => write!(f, "TTL rising"),
            TriggerSlope::TtlFalling => write!(f, "TTL falling"),
        }
    }
}

/// Interface the SR830 sends its responses to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputInterface {
    /// Responses go to the RS-232 port.
    #[default]
    Rs232,
    /// Responses go to the GPIB port.
    Gpib,
}

impl OutputInterface {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            OutputInterface::Rs232 => "0",
            OutputInterface::Gpib => "1",
        }
    }
}

/// Quantities that can be read with `SNAP?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapParameter {
    /// In-phase component.
    X,
    /// Quadrature component.
    Y,
    /// Magnitude.
    R,
    /// Phase.
    Theta,
    /// Aux input 1.
    Aux1,
    /// Aux input 2.
    Aux2,
    /// Aux input 3.
    Aux3,
    /// Aux input 4.
    Aux4,
    /// Reference frequency.
    Frequency,
    /// Value shown on the channel 1 display.
    Ch1Display,
    /// Value shown on the channel 2 display.
    Ch2Display,
}

impl SnapParameter {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            SnapParameter::X => "1",
            SnapParameter::Y => "2",
            SnapParameter::R => "3",
            SnapParameter::Theta => "4",
            SnapParameter::Aux1 => "5",
            SnapParameter::Aux2 => "6",
            SnapParameter::Aux3 => "7",
            SnapParameter::Aux4 => "8",
            SnapParameter::Frequency => "9",
            SnapParameter::Ch1Display => "10",
            SnapParameter::Ch2Display => "11",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_index() {
        assert_eq!(table_index(&SENSITIVITIES, 2e-9, "sensitivity").unwrap(), 0);
        assert_eq!(table_index(&SENSITIVITIES, 0.001, "sensitivity").unwrap(), 17);
        assert_eq!(table_index(&TIME_CONSTANTS, 0.1, "time constant").unwrap(), 8);
        assert_eq!(table_index(&TIME_CONSTANTS, 30e3, "time constant").unwrap(), 19);
        assert!(table_index(&SENSITIVITIES, 3e-3, "sensitivity").is_err());
    }

    #[test]
    fn test_table_value() {
        assert_eq!(table_value(&SENSITIVITIES, "26").unwrap(), 1.0);
        assert!(table_value(&SENSITIVITIES, "27").is_err());
        assert!(table_value(&TIME_CONSTANTS, "-1").is_err());
    }
}
