//! Performance metrics over a NAV history.
//!
//! Every metric is a pure function of the NAV series (and, for the
//! benchmark-relative block, the index closes). Values that cannot be
//! defined for the series at hand come back as `None`.
//!
//! Conventions:
//! - period returns are simple returns between consecutive observations
//! - CAGR annualizes over calendar days / 365
//! - volatility, Sharpe, Sortino, alpha and tracking error annualize with 252
//! - standard deviations are sample (n - 1)

use std::collections::BTreeMap;

use chrono::NaiveDate;
use navsim_core::engine::EquityPoint;
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,
    pub total_return: Option<f64>,
    pub cagr: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub max_drawdown_duration: usize,
    pub calmar: Option<f64>,
    pub win_rate: Option<f64>,
    pub benchmark: Option<BenchmarkMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub benchmark_cagr: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub tracking_error: Option<f64>,
    pub information_ratio: Option<f64>,
}

impl PerformanceMetrics {
    /// `None` when the history has fewer than two observations.
    pub fn compute(
        equity: &[EquityPoint],
        benchmark: Option<&BTreeMap<NaiveDate, f64>>,
        risk_free_rate: f64,
    ) -> Option<Self> {
        if equity.len() < 2 {
            return None;
        }
        let mut series: Vec<(NaiveDate, f64)> = equity.iter().map(|p| (p.date, p.nav)).collect();
        series.sort_by_key(|(d, _)| *d);

        let navs: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let returns = period_returns(&series);
        let values: Vec<f64> = returns.values().copied().collect();
        let cagr = cagr(&series);
        let (dd_abs, dd_pct) = max_drawdown(&navs);

        let benchmark = benchmark
            .filter(|b| b.len() >= 2)
            .map(|b| benchmark_metrics(&returns, b));

        Some(Self {
            start_date: series[0].0,
            end_date: series[series.len() - 1].0,
            observations: series.len(),
            total_return: total_return(&navs),
            cagr,
            volatility: annualized_volatility(&values),
            sharpe: sharpe_ratio(&values, risk_free_rate),
            sortino: sortino_ratio(&values, risk_free_rate),
            max_drawdown: dd_abs,
            max_drawdown_pct: dd_pct,
            max_drawdown_duration: max_drawdown_duration(&navs),
            calmar: calmar_ratio(cagr, dd_pct),
            win_rate: win_rate(&values),
            benchmark,
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Simple returns keyed by the later date. Steps off a zero level are skipped.
pub fn period_returns(series: &[(NaiveDate, f64)]) -> BTreeMap<NaiveDate, f64> {
    series
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
        .collect()
}

pub fn total_return(navs: &[f64]) -> Option<f64> {
    match (navs.first(), navs.last()) {
        (Some(&first), Some(&last)) if navs.len() >= 2 && first != 0.0 => Some(last / first - 1.0),
        _ => None,
    }
}

/// Compound annual growth over calendar time.
pub fn cagr(series: &[(NaiveDate, f64)]) -> Option<f64> {
    let (first, last) = (series.first()?, series.last()?);
    if series.len() < 2 || first.1 <= 0.0 {
        return None;
    }
    let years = (last.0 - first.0).num_days() as f64 / 365.0;
    if years <= 0.0 {
        return None;
    }
    Some((last.1 / first.1).powf(1.0 / years) - 1.0)
}

pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    sample_std(returns).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualized mean excess return over annualized volatility.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    let vol = annualized_volatility(returns)?;
    if vol <= 0.0 {
        return None;
    }
    Some(mean_excess(returns, risk_free_rate)? * TRADING_DAYS_PER_YEAR / vol)
}

/// Like Sharpe, with the root mean square of the losing periods as risk.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return None;
    }
    let rms = (downside.iter().map(|r| r * r).sum::<f64>() / downside.len() as f64).sqrt();
    let downside_vol = rms * TRADING_DAYS_PER_YEAR.sqrt();
    if downside_vol <= 0.0 {
        return None;
    }
    Some(mean_excess(returns, risk_free_rate)? * TRADING_DAYS_PER_YEAR / downside_vol)
}

/// Deepest fall below the running peak: (absolute, fraction of peak). Both ≤ 0.
pub fn max_drawdown(navs: &[f64]) -> (Option<f64>, Option<f64>) {
    if navs.len() < 2 {
        return (None, None);
    }
    let mut peak = f64::NEG_INFINITY;
    let mut worst_abs = 0.0_f64;
    let mut worst_pct: Option<f64> = None;
    for &nav in navs {
        peak = peak.max(nav);
        worst_abs = worst_abs.min(nav - peak);
        if peak != 0.0 {
            let pct = (nav - peak) / peak;
            worst_pct = Some(worst_pct.map_or(pct, |w| w.min(pct)));
        }
    }
    (Some(worst_abs), worst_pct)
}

/// Longest run of consecutive observations below the running peak.
pub fn max_drawdown_duration(navs: &[f64]) -> usize {
    let mut peak = f64::NEG_INFINITY;
    let mut run = 0;
    let mut longest = 0;
    for &nav in navs {
        peak = peak.max(nav);
        if nav < peak {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

pub fn calmar_ratio(cagr: Option<f64>, max_drawdown_pct: Option<f64>) -> Option<f64> {
    match (cagr, max_drawdown_pct) {
        (Some(c), Some(dd)) if dd < 0.0 => Some(c / dd.abs()),
        _ => None,
    }
}

/// Fraction of periods with a positive return.
pub fn win_rate(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    Some(returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64)
}

/// Alpha, beta and tracking error on the dates both return series share.
pub fn benchmark_metrics(
    strategy_returns: &BTreeMap<NaiveDate, f64>,
    closes: &BTreeMap<NaiveDate, f64>,
) -> BenchmarkMetrics {
    let index_series: Vec<(NaiveDate, f64)> = closes.iter().map(|(d, v)| (*d, *v)).collect();
    let index_returns = period_returns(&index_series);

    let (rs, rb): (Vec<f64>, Vec<f64>) = strategy_returns
        .iter()
        .filter_map(|(d, r)| index_returns.get(d).map(|b| (*r, *b)))
        .unzip();

    let beta = beta(&rs, &rb);
    let alpha_series: Option<Vec<f64>> =
        beta.map(|beta| rs.iter().zip(&rb).map(|(s, b)| s - beta * b).collect());
    let alpha = alpha_series
        .as_deref()
        .and_then(mean)
        .map(|m| m * TRADING_DAYS_PER_YEAR);
    let tracking_error = alpha_series
        .as_deref()
        .and_then(sample_std)
        .map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
    let information_ratio = match (alpha, tracking_error) {
        (Some(a), Some(te)) if te > 0.0 => Some(a / te),
        _ => None,
    };

    BenchmarkMetrics {
        benchmark_cagr: cagr(&index_series),
        alpha,
        beta,
        tracking_error,
        information_ratio,
    }
}

/// cov(s, b) / var(b), `None` under two paired observations or a flat index.
pub fn beta(strategy: &[f64], index: &[f64]) -> Option<f64> {
    if strategy.len() != index.len() || strategy.len() < 2 {
        return None;
    }
    let (ms, mb) = (mean(strategy)?, mean(index)?);
    let n = strategy.len() as f64 - 1.0;
    let cov = strategy
        .iter()
        .zip(index)
        .map(|(s, b)| (s - ms) * (b - mb))
        .sum::<f64>()
        / n;
    let var = index.iter().map(|b| (b - mb).powi(2)).sum::<f64>() / n;
    if var == 0.0 {
        None
    } else {
        Some(cov / var)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn mean_excess(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    mean(returns).map(|m| m - risk_free_rate / TRADING_DAYS_PER_YEAR)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(var.sqrt())
}
