use serde::{Deserialize, Serialize};

use super::position::Position;

/// Financial state of a run.
///
/// Every update is a plain overwrite (or, for accumulated liabilities, an
/// add). Ordering is the engine's job; the ledger validates nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAccount {
    cash: f64,
    market_value: f64,
    liabilities: f64,
    accumulated_liabilities: f64,
    nav: f64,
    positions: Vec<Position>,
}

impl LedgerAccount {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            market_value: 0.0,
            liabilities: 0.0,
            accumulated_liabilities: 0.0,
            nav: initial_cash,
            positions: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn market_value(&self) -> f64 {
        self.market_value
    }

    pub fn liabilities(&self) -> f64 {
        self.liabilities
    }

    pub fn accumulated_liabilities(&self) -> f64 {
        self.accumulated_liabilities
    }

    pub fn nav(&self) -> f64 {
        self.nav
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn update_cash(&mut self, value: f64) {
        self.cash = value;
    }

    pub fn update_market_value(&mut self, value: f64) {
        self.market_value = value;
    }

    pub fn update_positions(&mut self, positions: Vec<Position>) {
        self.positions = positions;
    }

    /// Today's accrual, overwritten daily.
    pub fn update_liabilities(&mut self, value: f64) {
        self.liabilities = value;
    }

    /// Adds to the unpaid balance carried until the next settlement.
    pub fn update_accumulated_liabilities(&mut self, value: f64) {
        self.accumulated_liabilities += value;
    }

    pub fn reset_accumulated_liabilities(&mut self) {
        self.accumulated_liabilities = 0.0;
    }

    pub fn update_nav(&mut self, value: f64) {
        self.nav = value;
    }
}
