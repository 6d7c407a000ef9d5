/// Position manager: turns a stock pool and a cash budget into tradable
/// volumes, and values buy and sell sets under the fee schedules.
use crate::domain::{Exchange, MarketData, Position};
use crate::error::EngineError;
use crate::fees::{calc_buy_total_cost, calc_sell_net_proceeds, BuyFeeSchedule, SellFeeSchedule};

use super::allocation::{self, Allocation, Candidate};

#[derive(Debug, Clone)]
pub struct PositionManager {
    buy: BuyFeeSchedule,
    sell: SellFeeSchedule,
}

impl PositionManager {
    pub fn new(buy: BuyFeeSchedule, sell: SellFeeSchedule) -> Self {
        Self { buy, sell }
    }

    pub fn buy_schedule(&self) -> &BuyFeeSchedule {
        &self.buy
    }

    /// Equal-weight, lot-rounded, fee-aware allocation of `total_budget`
    /// across `stock_pool` at today's open.
    ///
    /// Guarantees `Σ total cost + remaining == total_budget` (up to float
    /// error) and lot-aligned volumes.
    pub fn calculate_full_allocation(
        &self,
        stock_pool: &[String],
        total_budget: f64,
        market: &MarketData,
    ) -> Result<Allocation, EngineError> {
        let candidates = stock_pool
            .iter()
            .map(|symbol| {
                let exchange = Exchange::resolve(symbol)?;
                let snap = market.require(symbol)?;
                Ok(Candidate {
                    symbol: symbol.clone(),
                    exchange,
                    open: snap.open,
                    close: snap.close,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(allocation::allocate(candidates, total_budget, &self.buy))
    }

    /// Fee-inclusive cash needed to buy `positions` at their open price.
    pub fn calculate_total_cost(&self, positions: &[Position]) -> Result<f64, EngineError> {
        positions.iter().try_fold(0.0, |acc, p| {
            let exchange = Exchange::resolve(&p.symbol)?;
            Ok(acc + calc_buy_total_cost(p.open_buy_price, p.volume, exchange, &self.buy))
        })
    }

    /// Cash received from selling `positions` at today's close, after fees.
    pub fn calculate_net_sell_proceeds(
        &self,
        positions: &[Position],
        market: &MarketData,
    ) -> Result<f64, EngineError> {
        positions.iter().try_fold(0.0, |acc, p| {
            let exchange = Exchange::resolve(&p.symbol)?;
            let close = market.close(&p.symbol)?;
            Ok(acc + calc_sell_net_proceeds(close, p.volume, exchange, &self.sell))
        })
    }
}
