//! Reference scenarios recorded from a production run on 2026-01-12.
//!
//! A 40-stock pool allocated with a 3,287,211.99 budget under the standard
//! A-share buy schedule, and the same book marked at the next close.

use chrono::NaiveDate;
use navsim_core::domain::{Exchange, MarketData, MarketSnapshot, Position};
use navsim_core::fees::{calc_buy_total_cost, FeeConfig};
use navsim_core::position_management::PositionManager;

const TOTAL_BUDGET: f64 = 3_287_211.99;
const EXPECTED_TOTAL_COST: f64 = 3_286_988.391_258_500_5;
const EXPECTED_REMAINING: f64 = 223.598_741_499_605_24;
const TOL: f64 = 0.01;

/// (symbol, open, allocated volume), in ascending open order.
const BOOK: [(&str, f64, u64); 40] = [
    ("000415.SZ", 4.21, 19700),
    ("600390.SH", 5.9799999999999995, 13900),
    ("600517.SH", 6.33, 13000),
    ("000060.SZ", 6.62, 12500),
    ("002044.SZ", 6.74, 12200),
    ("000958.SZ", 6.8, 12100),
    ("000683.SZ", 7.57, 10900),
    ("002131.SZ", 8.21, 10100),
    ("600497.SH", 8.700000000000001, 9500),
    ("000039.SZ", 9.729999999999999, 8500),
    ("002065.SZ", 9.99, 8300),
    ("000050.SZ", 10.0, 8300),
    ("000009.SZ", 10.290000000000001, 8000),
    ("002195.SZ", 10.799999999999999, 7700),
    ("002312.SZ", 11.33, 7300),
    ("002064.SZ", 11.91, 6900),
    ("000528.SZ", 11.96, 6900),
    ("002153.SZ", 12.22, 6800),
    ("002152.SZ", 13.75, 6000),
    ("002203.SZ", 14.5, 5700),
    ("603766.SH", 15.0, 5500),
    ("002007.SZ", 15.65, 5300),
    ("002414.SZ", 16.37, 5100),
    ("000739.SZ", 16.43, 5100),
    ("002085.SZ", 16.68, 5000),
    ("000951.SZ", 16.950000000000003, 4900),
    ("000830.SZ", 16.99, 4900),
    ("002532.SZ", 18.28, 4400),
    ("000519.SZ", 19.720000000000002, 4100),
    ("000559.SZ", 19.85, 4100),
    ("000623.SZ", 20.25, 4000),
    ("600765.SH", 20.44, 4000),
    ("001696.SZ", 22.880000000000003, 3500),
    ("000738.SZ", 23.5, 3400),
    ("000062.SZ", 25.3, 3200),
    ("300207.SZ", 25.3, 3200),
    ("000021.SZ", 26.900000000000002, 3000),
    ("000400.SZ", 28.0, 2900),
    ("002130.SZ", 28.06, 2900),
    ("300390.SZ", 53.0, 1500),
];

/// Closes used to mark the book.
const CLOSES: [(&str, f64); 40] = [
    ("000050.SZ", 10.33),
    ("002130.SZ", 28.26),
    ("002152.SZ", 14.02),
    ("000830.SZ", 16.72),
    ("603766.SH", 14.83),
    ("000415.SZ", 4.09),
    ("600517.SH", 6.36),
    ("002532.SZ", 17.84),
    ("002065.SZ", 10.36),
    ("000958.SZ", 6.72),
    ("002195.SZ", 11.39),
    ("000559.SZ", 20.45),
    ("000009.SZ", 10.26),
    ("600497.SH", 8.57),
    ("002203.SZ", 14.41),
    ("000528.SZ", 11.94),
    ("000951.SZ", 16.92),
    ("600765.SH", 20.92),
    ("002414.SZ", 16.79),
    ("300207.SZ", 25.43),
    ("000400.SZ", 27.74),
    ("002007.SZ", 15.58),
    ("002064.SZ", 11.79),
    ("000519.SZ", 19.89),
    ("002153.SZ", 12.92),
    ("000039.SZ", 9.63),
    ("000060.SZ", 6.5),
    ("600390.SH", 6.04),
    ("002312.SZ", 11.47),
    ("000739.SZ", 16.25),
    ("000738.SZ", 24.87),
    ("000683.SZ", 7.37),
    ("002044.SZ", 6.74),
    ("002085.SZ", 16.99),
    ("000021.SZ", 27.50),
    ("001696.SZ", 23.25),
    ("000062.SZ", 25.95),
    ("002131.SZ", 8.21),
    ("300390.SZ", 52.90),
    ("000623.SZ", 20.33),
];

fn trade_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
}

fn manager() -> PositionManager {
    let cfg = FeeConfig::reference();
    PositionManager::new(cfg.buy, cfg.sell)
}

fn book_positions() -> Vec<Position> {
    BOOK.iter()
        .map(|(s, open, vol)| Position::new(*s, *open, *open, *vol))
        .collect()
}

#[test]
fn recorded_book_costs_match_fee_logic() {
    let total = manager().calculate_total_cost(&book_positions()).unwrap();
    assert!(
        (total - EXPECTED_TOTAL_COST).abs() < TOL,
        "total cost {total}, expected {EXPECTED_TOTAL_COST}"
    );
    assert!((TOTAL_BUDGET - total - EXPECTED_REMAINING).abs() < TOL);
}

#[test]
fn per_position_costs_sum_to_total() {
    let schedule = FeeConfig::reference().buy;
    let summed: f64 = BOOK
        .iter()
        .map(|(s, open, vol)| {
            calc_buy_total_cost(*open, *vol, Exchange::resolve(s).unwrap(), &schedule)
        })
        .sum();
    assert!((summed - EXPECTED_TOTAL_COST).abs() < TOL);
}

#[test]
fn allocation_reproduces_recorded_book() {
    let mut md = MarketData::new(trade_date());
    for (s, open, _) in BOOK {
        md.insert(s, MarketSnapshot::flat(open, trade_date()));
    }
    let pool: Vec<String> = BOOK.iter().map(|(s, _, _)| s.to_string()).collect();

    let alloc = manager()
        .calculate_full_allocation(&pool, TOTAL_BUDGET, &md)
        .unwrap();

    assert_eq!(alloc.positions.len(), 40);
    for (pos, (symbol, open, volume)) in alloc.positions.iter().zip(BOOK.iter()) {
        assert_eq!(pos.symbol, *symbol);
        assert_eq!(pos.open_buy_price, *open);
        assert_eq!(pos.volume, *volume, "{symbol}");
    }
    assert_eq!(alloc.topup_rounds, 2);
    assert!((alloc.remaining - EXPECTED_REMAINING).abs() < TOL);

    let cost = manager().calculate_total_cost(&alloc.positions).unwrap();
    assert!((cost + alloc.remaining - TOTAL_BUDGET).abs() < TOL);
}

#[test]
fn recorded_book_market_value() {
    let mut md = MarketData::new(trade_date());
    for (s, close) in CLOSES {
        md.insert(s, MarketSnapshot::flat(close, trade_date()));
    }
    let mv: f64 = book_positions()
        .iter()
        .map(|p| p.market_value(md.close(&p.symbol).unwrap()))
        .sum();
    assert!((mv - 3_307_532.0).abs() < 1.0, "market value {mv}");
}

#[test]
fn recorded_book_is_lot_aligned() {
    assert!(BOOK.iter().all(|(_, _, v)| v % 100 == 0));
}
