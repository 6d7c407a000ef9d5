//! The day-by-day loop.
//!
//! Per schedule day, in ascending date order:
//! 1. Fetch one snapshot for held symbols plus the day's schedule symbols
//! 2. Trade: buy, hold or sell depending on the day's flags
//! 3. Mark-to-market the resulting positions at today's close
//! 4. Accrue liabilities on yesterday's NAV (plus tax on today's sales)
//! 5. Settle on sell days, then update NAV and record the day

use std::collections::HashSet;

use crate::data::{MarketDataProvider, ScheduleDay, TradingSchedule};
use crate::domain::dates::previous_business_day;
use crate::domain::{LedgerAccount, MarketData, Position, StuckCause};
use crate::error::EngineError;
use crate::fees::FeeConfig;
use crate::position_management::PositionManager;

use super::day_type::DayType;
use super::diagnostics::{DailyRecord, Diagnostics, StuckEvent};
use super::liability::LiabilityManager;
use super::state::{EquityPoint, RunResult};

/// Flows produced by the trade step of a single day.
#[derive(Debug, Default)]
struct TradeOutcome {
    buy_cost: f64,
    sell_proceeds: f64,
    sold: Vec<Position>,
}

pub struct BacktestEngine<'a> {
    schedule: &'a TradingSchedule,
    provider: &'a dyn MarketDataProvider,
    initial_cash: f64,
    account: LedgerAccount,
    position_manager: PositionManager,
    liability_manager: LiabilityManager,
    diagnostics: Diagnostics,
    daily_records: Vec<DailyRecord>,
    equity_history: Vec<EquityPoint>,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(
        schedule: &'a TradingSchedule,
        provider: &'a dyn MarketDataProvider,
        initial_cash: f64,
        fees: &FeeConfig,
    ) -> Self {
        Self {
            schedule,
            provider,
            initial_cash,
            account: LedgerAccount::new(initial_cash),
            position_manager: PositionManager::new(fees.buy, fees.sell),
            liability_manager: LiabilityManager::new(fees.operational),
            diagnostics: Diagnostics::default(),
            daily_records: Vec::with_capacity(schedule.len()),
            equity_history: Vec::with_capacity(schedule.len() + 1),
        }
    }

    /// Simulate every schedule day. Aborts on the first fatal error.
    pub fn run(mut self) -> Result<RunResult, EngineError> {
        if let Some(first) = self.schedule.first_date() {
            self.equity_history.push(EquityPoint {
                date: previous_business_day(first),
                nav: self.account.nav(),
            });
        }

        let schedule = self.schedule;
        for day in schedule.days() {
            self.process_day(day)?;
        }

        log::info!(
            "run finished: {} days, final NAV {:.2} (start {:.2})",
            self.daily_records.len(),
            self.account.nav(),
            self.initial_cash
        );

        Ok(RunResult {
            initial_cash: self.initial_cash,
            equity_history: self.equity_history,
            daily_records: self.daily_records,
            diagnostics: self.diagnostics,
            final_account: self.account,
        })
    }

    fn process_day(&mut self, day: &ScheduleDay) -> Result<(), EngineError> {
        let date = day.date;
        let day_type = DayType::classify(day.first_trading_day, day.last_trading_day, date)?;
        if day.first_trading_day == 1 && day.last_trading_day == 1 {
            log::warn!("{date}: flagged as both first and last trading day, treating as a sell day");
        }

        let market = self.fetch_market(day)?;
        let cash_start = self.account.cash();

        let outcome = match day_type {
            DayType::Buy => self.buy(day, &market)?,
            DayType::Hold => TradeOutcome::default(),
            DayType::Sell => self.sell(day, &market)?,
        };
        self.diagnostics.count_day(day_type);

        let market_value = self.mark_to_market(&market)?;
        self.account.update_market_value(market_value);

        let is_sell_day = day_type == DayType::Sell;
        let liabilities_today = self.liability_manager.calculate_total_liabilities(
            self.account.nav(),
            &outcome.sold,
            is_sell_day,
            &market,
        )?;
        self.account.update_liabilities(liabilities_today);
        self.account.update_accumulated_liabilities(liabilities_today);
        self.diagnostics.total_liabilities += liabilities_today;

        let mut liabilities_paid = 0.0;
        let nav = if is_sell_day {
            liabilities_paid = self.account.accumulated_liabilities();
            self.account.update_cash(self.account.cash() - liabilities_paid);
            self.account.reset_accumulated_liabilities();
            self.account.cash() + self.account.market_value()
        } else {
            self.account.cash() + self.account.market_value()
                - self.account.accumulated_liabilities()
        };
        self.account.update_nav(nav);

        log::debug!(
            "{date} {day_type}: cash {:.2}, mv {:.2}, acc. liabilities {:.2}, NAV {:.2}",
            self.account.cash(),
            market_value,
            self.account.accumulated_liabilities(),
            nav
        );

        self.equity_history.push(EquityPoint { date, nav });
        self.daily_records.push(DailyRecord {
            date,
            day_type,
            cash_start,
            buy_cost: outcome.buy_cost,
            sell_proceeds: outcome.sell_proceeds,
            liabilities_today,
            accumulated_liabilities: self.account.accumulated_liabilities(),
            liabilities_paid,
            cash_end: self.account.cash(),
            market_value,
            nav,
            positions: self.account.positions().len(),
        });
        Ok(())
    }

    /// Snapshot for held symbols first, then the day's rows, without repeats.
    fn fetch_market(&self, day: &ScheduleDay) -> Result<MarketData, EngineError> {
        let mut seen = HashSet::new();
        let symbols: Vec<String> = self
            .account
            .positions()
            .iter()
            .map(|p| p.symbol.as_str())
            .chain(day.symbols())
            .filter(|s| seen.insert(*s))
            .map(str::to_string)
            .collect();
        Ok(self.provider.snapshot(&symbols, day.date)?)
    }

    fn buy(&mut self, day: &ScheduleDay, market: &MarketData) -> Result<TradeOutcome, EngineError> {
        let mut pool = Vec::with_capacity(day.rows.len());
        for row in &day.rows {
            if row.is_suspended() {
                self.diagnostics.excluded_suspended += 1;
                log::info!("{}: excluding {} (suspended)", day.date, row.symbol);
                continue;
            }
            let open = market.open(&row.symbol)?;
            if row.is_locked_up(open) {
                self.diagnostics.excluded_upper_limit += 1;
                log::info!(
                    "{}: excluding {} (open {open} at upper limit)",
                    day.date,
                    row.symbol
                );
                continue;
            }
            pool.push(row.symbol.clone());
        }

        let allocation = self.position_manager.calculate_full_allocation(
            &pool,
            self.account.cash(),
            market,
        )?;
        let buy_cost = self
            .position_manager
            .calculate_total_cost(&allocation.positions)?;

        let carried = self.account.positions().to_vec();
        if !carried.is_empty() {
            log::info!(
                "{}: carrying {} stuck position(s) into the new cycle",
                day.date,
                carried.len()
            );
        }
        let merged: Vec<Position> = allocation
            .positions
            .into_iter()
            .filter(|p| p.volume > 0)
            .chain(carried)
            .collect();
        self.account.update_positions(merged);
        self.account.update_cash(self.account.cash() - buy_cost);

        self.diagnostics.total_buy_cost += buy_cost;
        Ok(TradeOutcome {
            buy_cost,
            ..TradeOutcome::default()
        })
    }

    fn sell(&mut self, day: &ScheduleDay, market: &MarketData) -> Result<TradeOutcome, EngineError> {
        let mut keep = Vec::new();
        let mut sold = Vec::new();

        for mut pos in self.account.positions().to_vec() {
            let close = market.close(&pos.symbol)?;
            if !mark_if_stuck(&mut pos, day, close) {
                sold.push(pos);
                continue;
            }
            self.diagnostics.record_stuck(StuckEvent {
                date: day.date,
                symbol: pos.symbol.clone(),
                cause: pos.stuck_cause,
            })?;
            log::info!(
                "{}: {} stuck ({}), carried to the next cycle",
                day.date,
                pos.symbol,
                pos.stuck_cause
            );
            keep.push(pos);
        }

        let sell_proceeds = self
            .position_manager
            .calculate_net_sell_proceeds(&sold, market)?;
        self.account.update_positions(keep);
        self.account.update_cash(self.account.cash() + sell_proceeds);

        self.diagnostics.total_sell_proceeds += sell_proceeds;
        Ok(TradeOutcome {
            buy_cost: 0.0,
            sell_proceeds,
            sold,
        })
    }

    fn mark_to_market(&self, market: &MarketData) -> Result<f64, EngineError> {
        self.account
            .positions()
            .iter()
            .try_fold(0.0, |acc, p| Ok(acc + p.market_value(market.close(&p.symbol)?)))
    }
}

/// Decide whether `pos` stays stuck today, updating its cause in place.
fn mark_if_stuck(pos: &mut Position, day: &ScheduleDay, close: f64) -> bool {
    if pos.stuck_cause == StuckCause::Suspension {
        if let Some(end) = pos.suspension_end_date {
            if day.date < end {
                return true;
            }
        }
    }

    let Some(row) = day.row(&pos.symbol) else {
        log::debug!("{}: no schedule row for held {}, selling", day.date, pos.symbol);
        return false;
    };

    if row.is_suspended() {
        pos.stuck_cause = StuckCause::Suspension;
        pos.suspension_end_date = row.suspension_end_last_tradeable_date;
        return true;
    }
    if row.is_locked_down(close) {
        pos.stuck_cause = StuckCause::LimitDown;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TradingDayRow;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn row(date: NaiveDate, symbol: &str) -> TradingDayRow {
        TradingDayRow {
            daily_date: date,
            symbol: symbol.into(),
            first_trading_day: 0,
            last_trading_day: 1,
            upper_limit_price: Some(11.0),
            lower_limit_price: Some(9.0),
            suspension_start: None,
            suspension_end: None,
            suspension_end_last_tradeable_date: None,
        }
    }

    fn sell_day(rows: Vec<TradingDayRow>, date: NaiveDate) -> ScheduleDay {
        ScheduleDay {
            date,
            first_trading_day: 0,
            last_trading_day: 1,
            rows,
        }
    }

    #[test]
    fn suspension_with_future_end_stays_stuck_without_row() {
        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        pos.stuck_cause = StuckCause::Suspension;
        pos.suspension_end_date = Some(d(30));
        assert!(mark_if_stuck(&mut pos, &sell_day(vec![], d(23)), 10.0));
    }

    #[test]
    fn suspension_end_reached_is_reevaluated() {
        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        pos.stuck_cause = StuckCause::Suspension;
        pos.suspension_end_date = Some(d(23));
        let day = sell_day(vec![row(d(23), "600000.SH")], d(23));
        assert!(!mark_if_stuck(&mut pos, &day, 10.0));
    }

    #[test]
    fn suspended_row_sets_end_date() {
        let mut r = row(d(16), "600000.SH");
        r.suspension_start = Some(d(14));
        r.suspension_end_last_tradeable_date = Some(d(28));
        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        assert!(mark_if_stuck(&mut pos, &sell_day(vec![r], d(16)), 10.0));
        assert_eq!(pos.stuck_cause, StuckCause::Suspension);
        assert_eq!(pos.suspension_end_date, Some(d(28)));
    }

    #[test]
    fn close_at_lower_limit_is_limit_down() {
        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        let day = sell_day(vec![row(d(16), "600000.SH")], d(16));
        assert!(mark_if_stuck(&mut pos, &day, 9.0));
        assert_eq!(pos.stuck_cause, StuckCause::LimitDown);

        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        assert!(!mark_if_stuck(&mut pos, &day, 9.01));
    }

    #[test]
    fn unknown_suspension_end_without_row_is_sellable() {
        let mut pos = Position::new("600000.SH", 10.0, 10.0, 100);
        pos.stuck_cause = StuckCause::Suspension;
        pos.suspension_end_date = None;
        assert!(!mark_if_stuck(&mut pos, &sell_day(vec![], d(23)), 10.0));
    }
}
