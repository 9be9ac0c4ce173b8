//! Named entities of the two-market model.
//!
//! The model file is external, so these names are a fixed contract: the
//! scenario writer emits exactly these sets and params, and the decoder reads
//! exactly these variables. Backends check them against the model before a
//! solve.

use std::fmt;

/// Index sets populated from the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelSet {
    Intervals,
    ReservePrice,
    DayAheadPrice,
}

impl ModelSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSet::Intervals => "INTERVALS",
            ModelSet::ReservePrice => "DFFR_PRICE",
            ModelSet::DayAheadPrice => "DA_PRICE",
        }
    }

    pub fn all() -> &'static [ModelSet] {
        &[
            ModelSet::Intervals,
            ModelSet::ReservePrice,
            ModelSet::DayAheadPrice,
        ]
    }
}

/// Parameters populated by the scenario builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelParam {
    Cost,
    Ramp,
    RampReserve,
    PowerMax,
    /// Probability weight per reserve price.
    ReserveWeight,
    /// Probability weight per day-ahead price.
    DayAheadWeight,
}

impl ModelParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelParam::Cost => "Cost",
            ModelParam::Ramp => "Ramp",
            ModelParam::RampReserve => "Ramp_DFFR",
            ModelParam::PowerMax => "P_MAX",
            ModelParam::ReserveWeight => "p_R",
            ModelParam::DayAheadWeight => "p_DA",
        }
    }

    pub fn all() -> &'static [ModelParam] {
        &[
            ModelParam::Cost,
            ModelParam::Ramp,
            ModelParam::RampReserve,
            ModelParam::PowerMax,
            ModelParam::ReserveWeight,
            ModelParam::DayAheadWeight,
        ]
    }
}

/// Decision variables read back after the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelVar {
    /// Reserve bid-level indicator, indexed by level.
    ///
    /// The model must index it `1..card(DFFR_PRICE)`: the decoder reads the
    /// chosen level from the subscript itself.
    ReserveLevel,
    /// Day-ahead bid-level indicator, indexed by (reserve rank, level, interval).
    DayAheadLevel,
    /// Reserve bid quantity.
    ReserveAmount,
    /// Day-ahead bid quantity, same index as [`ModelVar::DayAheadLevel`].
    DayAheadAmount,
    /// Accepted reserve quantity.
    ReserveAccepted,
    /// Accepted day-ahead quantity.
    DayAheadAccepted,
}

impl ModelVar {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVar::ReserveLevel => "d_R",
            ModelVar::DayAheadLevel => "d_DA",
            ModelVar::ReserveAmount => "q_R",
            ModelVar::DayAheadAmount => "q_DA",
            ModelVar::ReserveAccepted => "Q_R",
            ModelVar::DayAheadAccepted => "Q_DA",
        }
    }

    pub fn all() -> &'static [ModelVar] {
        &[
            ModelVar::ReserveLevel,
            ModelVar::DayAheadLevel,
            ModelVar::ReserveAmount,
            ModelVar::DayAheadAmount,
            ModelVar::ReserveAccepted,
            ModelVar::DayAheadAccepted,
        ]
    }

    /// Look up a handle by its model name.
    pub fn from_name(name: &str) -> Option<ModelVar> {
        ModelVar::all().iter().copied().find(|v| v.as_str() == name)
    }
}

impl fmt::Display for ModelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ModelParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ModelVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
