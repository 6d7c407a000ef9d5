//! Fee arithmetic.
//!
//! All functions are total: non-positive amounts, prices or zero volumes
//! cost nothing rather than erroring.

use super::schedule::{BuyFeeSchedule, SellFeeSchedule};
use crate::domain::Exchange;

/// Fees on a buy of notional `amount`.
pub fn calc_buy_fees(amount: f64, exchange: Exchange, schedule: &BuyFeeSchedule) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    let base = (amount * schedule.base_rate()).max(schedule.min_fee);
    let transfer = if exchange.is_shanghai() {
        amount * schedule.transfer_fee_rate_sh
    } else {
        0.0
    };
    base + transfer
}

/// Cash needed for a buy: notional plus fees.
pub fn calc_buy_total_cost(
    price: f64,
    volume: u64,
    exchange: Exchange,
    schedule: &BuyFeeSchedule,
) -> f64 {
    if price <= 0.0 || volume == 0 {
        return 0.0;
    }
    let amount = price * volume as f64;
    amount + calc_buy_fees(amount, exchange, schedule)
}

/// Fees on a sell of notional `amount`, stamp tax included.
pub fn calc_sell_fees(amount: f64, exchange: Exchange, schedule: &SellFeeSchedule) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    let base = (amount * schedule.base_rate()).max(schedule.min_fee);
    let transfer = if exchange.is_shanghai() {
        amount * schedule.transfer_fee_rate_sh
    } else {
        0.0
    };
    base + transfer + amount * schedule.stamp_tax_rate
}

/// Cash received from a sell: notional minus fees.
pub fn calc_sell_net_proceeds(
    price: f64,
    volume: u64,
    exchange: Exchange,
    schedule: &SellFeeSchedule,
) -> f64 {
    if price <= 0.0 || volume == 0 {
        return 0.0;
    }
    let amount = price * volume as f64;
    amount - calc_sell_fees(amount, exchange, schedule)
}

/// Extra cash needed to grow a planned buy from `current_volume` to
/// `current_volume + add_volume`. Compares totals so the minimum fee is
/// only charged once.
pub fn calc_incremental_cost(
    price: f64,
    current_volume: u64,
    add_volume: u64,
    exchange: Exchange,
    schedule: &BuyFeeSchedule,
) -> f64 {
    if add_volume == 0 {
        return 0.0;
    }
    let before = calc_buy_total_cost(price, current_volume, exchange, schedule);
    let after = calc_buy_total_cost(price, current_volume + add_volume, exchange, schedule);
    (after - before).max(0.0)
}
