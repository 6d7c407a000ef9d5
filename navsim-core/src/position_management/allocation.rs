//! Equal-weight allocation under a nonlinear fee schedule.
//!
//! Phase 1 gives each symbol `budget / n` and binary-searches the largest
//! lot count whose fee-inclusive cost fits. Phase 2 spends the leftover in
//! rounds, one lot per symbol per round, cheapest open price first. Each
//! productive round strictly lowers `remaining`, and a round that adds
//! nothing ends the loop, so phase 2 terminates; the round cap is a backstop.

use serde::{Deserialize, Serialize};

use crate::domain::{Exchange, Position, LOT_SIZE};
use crate::fees::{calc_buy_total_cost, calc_incremental_cost, BuyFeeSchedule};

/// Hard cap on top-up rounds.
pub const MAX_TOPUP_ROUNDS: usize = 10_000;

/// Increments below this are treated as free and skipped.
const MIN_INCREMENT: f64 = 1.0;

/// Output of an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Sorted ascending by open price.
    pub positions: Vec<Position>,
    /// Unspent budget after fees.
    pub remaining: f64,
    /// Number of top-up rounds that added at least one lot.
    pub topup_rounds: usize,
}

impl Allocation {
    pub fn empty(total_budget: f64) -> Self {
        Self {
            positions: Vec::new(),
            remaining: total_budget,
            topup_rounds: 0,
        }
    }
}

/// Largest lot-aligned volume with `calc_buy_total_cost <= budget`.
pub fn max_volume_for_budget(
    price: f64,
    budget: f64,
    exchange: Exchange,
    schedule: &BuyFeeSchedule,
) -> u64 {
    if budget <= 0.0 || price <= 0.0 || !budget.is_finite() || !price.is_finite() {
        return 0;
    }

    // Fees only make things more expensive, so the fee-free lot count bounds it.
    let mut hi = (budget / price / LOT_SIZE as f64).floor() as u64;
    let mut lo = 0u64;
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if calc_buy_total_cost(price, mid * LOT_SIZE, exchange, schedule) <= budget {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo * LOT_SIZE
}

/// Candidate for allocation: exchange already resolved, prices already read.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub symbol: String,
    pub exchange: Exchange,
    pub open: f64,
    pub close: f64,
}

/// Run both phases over resolved candidates.
pub(crate) fn allocate(
    candidates: Vec<Candidate>,
    total_budget: f64,
    schedule: &BuyFeeSchedule,
) -> Allocation {
    if candidates.is_empty() {
        return Allocation::empty(total_budget);
    }

    let per_stock_budget = total_budget / candidates.len() as f64;
    let mut planned: Vec<(Candidate, u64)> = candidates
        .into_iter()
        .map(|c| {
            let volume = max_volume_for_budget(c.open, per_stock_budget, c.exchange, schedule);
            (c, volume)
        })
        .collect();

    let allocated: f64 = planned
        .iter()
        .map(|(c, v)| calc_buy_total_cost(c.open, *v, c.exchange, schedule))
        .sum();
    let mut remaining = total_budget - allocated;

    // Stable: ties keep pool order.
    planned.sort_by(|a, b| a.0.open.total_cmp(&b.0.open));

    let mut topup_rounds = 0usize;
    loop {
        if topup_rounds >= MAX_TOPUP_ROUNDS {
            log::warn!(
                "top-up stopped at the {MAX_TOPUP_ROUNDS}-round cap with {remaining:.2} unspent"
            );
            break;
        }

        let mut added = false;
        for (c, volume) in planned.iter_mut() {
            if c.open <= 0.0 {
                continue;
            }
            let increment = calc_incremental_cost(c.open, *volume, LOT_SIZE, c.exchange, schedule);
            if increment < MIN_INCREMENT {
                continue;
            }
            if remaining >= increment {
                *volume += LOT_SIZE;
                remaining -= increment;
                added = true;
            }
        }

        if !added {
            break;
        }
        topup_rounds += 1;
    }

    if topup_rounds > 0 {
        log::debug!("top-up finished after {topup_rounds} round(s)");
    }
    log::info!(
        "allocation: budget {:.2}, deployed {:.2}, remaining {:.2}",
        total_budget,
        total_budget - remaining,
        remaining
    );

    Allocation {
        positions: planned
            .into_iter()
            .map(|(c, volume)| Position::new(c.symbol, c.open, c.close, volume))
            .collect(),
        remaining,
        topup_rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::FeeConfig;

    fn buy() -> BuyFeeSchedule {
        FeeConfig::reference().buy
    }

    fn candidate(symbol: &str, open: f64) -> Candidate {
        Candidate {
            symbol: symbol.to_string(),
            exchange: Exchange::resolve(symbol).unwrap(),
            open,
            close: open,
        }
    }

    #[test]
    fn max_volume_fits_budget_and_next_lot_does_not() {
        let schedule = buy();
        let v = max_volume_for_budget(10.0, 10_000.0, Exchange::Sz, &schedule);
        assert_eq!(v % LOT_SIZE, 0);
        assert!(calc_buy_total_cost(10.0, v, Exchange::Sz, &schedule) <= 10_000.0);
        assert!(calc_buy_total_cost(10.0, v + LOT_SIZE, Exchange::Sz, &schedule) > 10_000.0);
        // 1000 shares cost 10_005 with the minimum fee, so 900 is the answer.
        assert_eq!(v, 900);
    }

    #[test]
    fn max_volume_degenerate_inputs() {
        let schedule = buy();
        assert_eq!(max_volume_for_budget(0.0, 1_000.0, Exchange::Sh, &schedule), 0);
        assert_eq!(max_volume_for_budget(10.0, 0.0, Exchange::Sh, &schedule), 0);
        assert_eq!(max_volume_for_budget(10.0, -5.0, Exchange::Sh, &schedule), 0);
        // Less than one lot affordable.
        assert_eq!(max_volume_for_budget(100.0, 9_000.0, Exchange::Sh, &schedule), 0);
    }

    #[test]
    fn empty_pool_keeps_whole_budget() {
        let alloc = allocate(Vec::new(), 5_000.0, &buy());
        assert!(alloc.positions.is_empty());
        assert_eq!(alloc.remaining, 5_000.0);
        assert_eq!(alloc.topup_rounds, 0);
    }

    #[test]
    fn top_up_spends_leftover_on_cheapest_first() {
        let schedule = buy();
        let alloc = allocate(
            vec![candidate("600000.SH", 20.0), candidate("000001.SZ", 5.0)],
            30_000.0,
            &schedule,
        );
        assert_eq!(alloc.positions[0].symbol, "000001.SZ");
        assert_eq!(alloc.positions[1].symbol, "600000.SH");

        let spent: f64 = alloc
            .positions
            .iter()
            .map(|p| {
                calc_buy_total_cost(
                    p.open_buy_price,
                    p.volume,
                    Exchange::resolve(&p.symbol).unwrap(),
                    &schedule,
                )
            })
            .sum();
        assert!((spent + alloc.remaining - 30_000.0).abs() < 1e-2);
        assert!(alloc.remaining >= 0.0);
        // Not even the cheapest lot fits in what is left.
        assert!(alloc.remaining < 500.0 + 1e-9);
    }

    #[test]
    fn zero_price_symbol_gets_nothing() {
        let alloc = allocate(
            vec![candidate("600000.SH", 0.0), candidate("000001.SZ", 5.0)],
            10_000.0,
            &buy(),
        );
        let zero = alloc
            .positions
            .iter()
            .find(|p| p.symbol == "600000.SH")
            .unwrap();
        assert_eq!(zero.volume, 0);
    }
}
