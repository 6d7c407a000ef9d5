//! Daily operating-fee and capital-gains-tax accrual.

use crate::domain::{MarketData, Position};
use crate::error::EngineError;
use crate::fees::LiabilityFeeSchedule;

#[derive(Debug, Clone)]
pub struct LiabilityManager {
    schedule: LiabilityFeeSchedule,
}

impl LiabilityManager {
    pub fn new(schedule: LiabilityFeeSchedule) -> Self {
        Self { schedule }
    }

    /// Operating fee on yesterday's NAV, plus tax on today's sales when
    /// `is_sell_day`.
    pub fn calculate_total_liabilities(
        &self,
        yesterday_nav: f64,
        sold_today: &[Position],
        is_sell_day: bool,
        sell_prices: &MarketData,
    ) -> Result<f64, EngineError> {
        let operating = yesterday_nav * self.schedule.daily_operating_rate();
        if !is_sell_day {
            return Ok(operating);
        }
        Ok(operating + self.calculate_tax_liabilities(sold_today, sell_prices)?)
    }

    /// Tax on realized gains. Losses contribute nothing.
    pub fn calculate_tax_liabilities(
        &self,
        sold: &[Position],
        sell_prices: &MarketData,
    ) -> Result<f64, EngineError> {
        sold.iter().try_fold(0.0, |acc, p| {
            let price = sell_prices.close(&p.symbol)?;
            let gain = if price > p.open_buy_price {
                p.volume as f64 * (price - p.open_buy_price) * self.schedule.tax_fee_rate
            } else {
                0.0
            };
            Ok(acc + gain)
        })
    }
}
