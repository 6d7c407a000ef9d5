//! Run diagnostic summary: NAV, cash flow, exclusions, stuck positions and
//! the final book.

use navsim_core::engine::{RunResult, StuckEvent};

use super::thousands;

const RULE_WIDTH: usize = 50;
const LISTED: usize = 5;

pub struct DiagnosticReportGenerator;

impl DiagnosticReportGenerator {
    pub fn generate(&self, result: &RunResult) -> String {
        let (first_nav, last_nav) = match (
            result.equity_history.first(),
            result.equity_history.last(),
        ) {
            (Some(first), Some(last)) => (first.nav, last.nav),
            _ => return "No equity history.".to_string(),
        };
        let ret_pct = if first_nav != 0.0 {
            (last_nav / first_nav - 1.0) * 100.0
        } else {
            0.0
        };
        let d = &result.diagnostics;
        let rule = "=".repeat(RULE_WIDTH);

        let mut lines = vec![
            String::new(),
            rule.clone(),
            "BACKTEST DIAGNOSTIC".to_string(),
            rule.clone(),
            format!("Initial NAV:     {:>15}", thousands(first_nav)),
            format!("Final NAV:       {:>15}", thousands(last_nav)),
            format!("Return:          {:>14.2}%", ret_pct),
            String::new(),
            "--- Cash flow ---".to_string(),
            format!(
                "Total buy cost:      {:>15}  (over {} buy days)",
                thousands(d.total_buy_cost),
                d.buy_days
            ),
            format!(
                "Total sell proceeds: {:>15}  (over {} sell days)",
                thousands(d.total_sell_proceeds),
                d.sell_days
            ),
            format!("Net trading:         {:>15}", thousands(d.net_trading())),
            format!(
                "Total liabilities:   {:>15}  (fees + tax)",
                thousands(d.total_liabilities)
            ),
            String::new(),
            "--- Exclusions (buy-side) ---".to_string(),
            format!("Suspended:      {:>6}", d.excluded_suspended),
            format!("Upper limit:    {:>6}", d.excluded_upper_limit),
            String::new(),
            "--- Stuck (sell-side) ---".to_string(),
        ];
        push_stuck(&mut lines, "Limit down:  ", &d.stuck_limit_down);
        push_stuck(&mut lines, "Suspension:  ", &d.stuck_suspension);

        let account = &result.final_account;
        lines.extend([
            String::new(),
            "--- Final state ---".to_string(),
            format!("Cash:          {:>15}", thousands(account.cash())),
            format!("Market value:  {:>15}", thousands(account.market_value())),
            format!("Positions:     {}", account.positions().len()),
        ]);
        for p in account.positions().iter().take(LISTED) {
            lines.push(format!("  {}: {} @ {}", p.symbol, p.volume, p.open_buy_price));
        }
        if account.positions().len() > LISTED {
            lines.push(format!(
                "  ... and {} more",
                account.positions().len() - LISTED
            ));
        }
        lines.push(rule);

        lines.join("\n")
    }
}

fn push_stuck(lines: &mut Vec<String>, label: &str, events: &[StuckEvent]) {
    lines.push(format!("{label} {} occurrences", events.len()));
    for e in events.iter().take(LISTED) {
        lines.push(format!("  {} {}", e.date.format("%Y%m%d"), e.symbol));
    }
    if events.len() > LISTED {
        lines.push(format!("  ... and {} more", events.len() - LISTED));
    }
}
