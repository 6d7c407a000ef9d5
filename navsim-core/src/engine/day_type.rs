use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// What the schedule asks for on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Buy,
    Hold,
    Sell,
}

impl DayType {
    /// `(1,0)` buy, `(0,0)` hold, `(_,1)` sell, anything else is fatal.
    pub fn classify(first: u8, last: u8, date: NaiveDate) -> Result<Self, EngineError> {
        match (first, last) {
            (1, 0) => Ok(DayType::Buy),
            (0, 0) => Ok(DayType::Hold),
            (0 | 1, 1) => Ok(DayType::Sell),
            _ => Err(EngineError::InvalidDayType { date, first, last }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Buy => "buy",
            DayType::Hold => "hold",
            DayType::Sell => "sell",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
