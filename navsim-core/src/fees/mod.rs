//! Trading-cost and operating-expense schedules plus the fee arithmetic.
//!
//! Buy side: `max(amount * (commission + csrc + handling), min_fee)`, plus the
//! Shanghai transfer fee. Sell side adds stamp tax on top. The minimum only
//! applies to the commission-like part; transfer and stamp are never floored.

pub mod calc;
pub mod schedule;

pub use calc::{
    calc_buy_fees, calc_buy_total_cost, calc_incremental_cost, calc_sell_fees,
    calc_sell_net_proceeds,
};
pub use schedule::{
    BuyFeeSchedule, FeeConfig, FeeConfigError, LiabilityFeeSchedule, SellFeeSchedule,
};
