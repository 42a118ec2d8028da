//! Settings of the PBZ that are selected from a fixed set of options.

use std::fmt::Display;

/// Operation mode of the PBZ.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Constant voltage.
    #[default]
    ConstantVoltage,
    /// Constant current.
    ConstantCurrent,
}

impl OperationMode {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            OperationMode::ConstantVoltage => "CV",
            OperationMode::ConstantCurrent => "CC",
        }
    }
}

impl Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::ConstantVoltage => write!(f, "Constant voltage"),
            OperationMode::ConstantCurrent => write!(f, "Constant current"),
        }
    }
}

/// Output polarity of the PBZ.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Output can swing positive and negative.
    #[default]
    Bipolar,
    /// Output is positive only.
    Unipolar,
}

impl Polarity {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            Polarity::Bipolar => "BIPolar",
            Polarity::Unipolar => "UNIPolar",
        }
    }
}

/// Source of the output signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// Internal signal source.
    #[default]
    Internal,
    /// External signal input.
    External,
    /// Sum of the internal and external signal.
    Both,
}

impl SignalSource {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            SignalSource::Internal => "INT",
            SignalSource::External => "EXT",
            SignalSource::Both => "BOTH",
        }
    }
}

/// Output state after the instrument is powered on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PowerOnState {
    /// Output is off after power on.
    #[default]
    Reset,
    /// Output is restored to the state it had at power off.
    Auto,
}

impl PowerOnState {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            PowerOnState::Reset => "RST",
            PowerOnState::Auto => "AUTO",
        }
    }
}

/// Logic of the external output on/off control signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ControlPolarity {
    /// High level switches the output on.
    #[default]
    Normal,
    /// Low level switches the output on.
    Inverted,
}

impl ControlPolarity {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            ControlPolarity::Normal => "NORM",
            ControlPolarity::Inverted => "INV",
        }
    }
}

/// Edge polarity of trigger signals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolarity {
    /// Rising edge.
    #[default]
    Positive,
    /// Falling edge.
    Negative,
}

impl TriggerPolarity {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            TriggerPolarity::Positive => "POS",
            TriggerPolarity::Negative => "NEG",
        }
    }
}

/// Quantity reported by the measurement subsystem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementFunction {
    /// DC average.
    #[default]
    Dc,
    /// AC rms.
    Ac,
    /// Total rms.
    DcAc,
    /// Peak value.
    Peak,
}

impl MeasurementFunction {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            MeasurementFunction::Dc => "DC",
            MeasurementFunction::Ac => "AC",
            MeasurementFunction::DcAc => "DCAC",
            MeasurementFunction::Peak => "PEAK",
        }
    }
}

/// What starts a measurement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// Measure continuously.
    #[default]
    Auto,
    /// Internal trigger.
    Internal,
    /// Rising edge on the external trigger input.
    ExternalPositive,
    /// Falling edge on the external trigger input.
    ExternalNegative,
}

impl TriggerSource {
    pub(crate) fn to_cmd_str(self) -> &'static str {
        match self {
            TriggerSource::Auto => "AUTO",
            TriggerSource::Internal => "INT",
            TriggerSource::ExternalPositive => "EXTPOS",
            TriggerSource::ExternalNegative => "EXTNEG",
        }
    }
}
