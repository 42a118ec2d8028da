//! Source and output modes of the B2900.

use std::fmt::Display;

/// What the instrument sources.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Source a current and measure the voltage that builds up.
    #[default]
    Current,
    /// Source a voltage.
    Voltage,
}

impl SourceMode {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            SourceMode::Current => "CURR",
            SourceMode::Voltage => "VOLT",
        }
    }
}

impl Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Current => write!(f, "Current"),
            SourceMode::Voltage => write!(f, "Voltage"),
        }
    }
}

/// State of the output terminals after the output is switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOffMode {
    /// Output relay stays closed, the source is set to zero.
    Zero,
    /// Output relay opens.
    HighImpedance,
    /// Output relay opens after the source was set to zero.
    Normal,
}

impl OutputOffMode {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            OutputOffMode::Zero => "ZERO",
            OutputOffMode::HighImpedance => "HIZ",
            OutputOffMode::Normal => "NORM",
        }
    }
}

impl Display for OutputOffMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputOffMode::Zero => write!(f, "Zero"),
            OutputOffMode::HighImpedance => write!(f, "High impedance"),
            OutputOffMode::Normal => write!(f, "Normal"),
        }
    }
}
