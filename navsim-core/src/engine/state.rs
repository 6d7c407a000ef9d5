//! Run result types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::diagnostics::{DailyRecord, Diagnostics};
use crate::domain::dates::date_key;
use crate::domain::LedgerAccount;

/// One NAV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

impl EquityPoint {
    /// `YYYYMMDD`
    pub fn date_key(&self) -> String {
        date_key(self.date)
    }
}

/// Everything a finished run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub initial_cash: f64,
    /// Seeded with the business day before the first schedule day.
    pub equity_history: Vec<EquityPoint>,
    pub daily_records: Vec<DailyRecord>,
    pub diagnostics: Diagnostics,
    pub final_account: LedgerAccount,
}

impl RunResult {
    pub fn final_nav(&self) -> f64 {
        self.equity_history
            .last()
            .map(|p| p.nav)
            .unwrap_or(self.initial_cash)
    }

    pub fn total_return(&self) -> f64 {
        if self.initial_cash > 0.0 {
            self.final_nav() / self.initial_cash - 1.0
        } else {
            0.0
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.equity_history.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.equity_history.last().map(|p| p.date)
    }
}
