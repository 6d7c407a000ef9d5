//! Run diagnostics: running totals, exclusion counters, stuck events and
//! one record per simulated day. Outputs only; never read back by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::day_type::DayType;
use crate::domain::StuckCause;
use crate::error::EngineError;

/// A held position that could not be sold on a sell day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckEvent {
    pub date: NaiveDate,
    pub symbol: String,
    pub cause: StuckCause,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub total_buy_cost: f64,
    pub total_sell_proceeds: f64,
    pub total_liabilities: f64,
    pub buy_days: usize,
    pub hold_days: usize,
    pub sell_days: usize,
    pub excluded_suspended: usize,
    pub excluded_upper_limit: usize,
    pub stuck_limit_down: Vec<StuckEvent>,
    pub stuck_suspension: Vec<StuckEvent>,
}

impl Diagnostics {
    /// File `event` under its cause. An event without a cause is an error.
    pub fn record_stuck(&mut self, event: StuckEvent) -> Result<(), EngineError> {
        match event.cause {
            StuckCause::LimitDown => self.stuck_limit_down.push(event),
            StuckCause::Suspension => self.stuck_suspension.push(event),
            StuckCause::None => {
                return Err(EngineError::UnknownStuckCause {
                    symbol: event.symbol,
                    date: event.date,
                })
            }
        }
        Ok(())
    }

    pub fn count_day(&mut self, day_type: DayType) {
        match day_type {
            DayType::Buy => self.buy_days += 1,
            DayType::Hold => self.hold_days += 1,
            DayType::Sell => self.sell_days += 1,
        }
    }

    /// Every stuck event, in date order.
    pub fn stuck_events(&self) -> Vec<&StuckEvent> {
        let mut all: Vec<&StuckEvent> = self
            .stuck_limit_down
            .iter()
            .chain(self.stuck_suspension.iter())
            .collect();
        all.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
        all
    }

    pub fn net_trading(&self) -> f64 {
        self.total_sell_proceeds - self.total_buy_cost
    }
}

/// End-of-day snapshot of the ledger and the day's flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub cash_start: f64,
    pub buy_cost: f64,
    pub sell_proceeds: f64,
    pub liabilities_today: f64,
    pub accumulated_liabilities: f64,
    pub liabilities_paid: f64,
    pub cash_end: f64,
    pub market_value: f64,
    pub nav: f64,
    pub positions: usize,
}
