//! Sectioned performance summary.

use crate::metrics::PerformanceMetrics;

use super::thousands;

const WIDTH: usize = 56;
const UNDEFINED: &str = "—";

pub struct PerformanceReportGenerator;

impl PerformanceReportGenerator {
    pub fn generate(&self, m: &PerformanceMetrics) -> String {
        let mut sections: Vec<(&str, Vec<(&str, String)>)> = vec![
            (
                "Period",
                vec![
                    ("Start Date", m.start_date.format("%Y-%m-%d").to_string()),
                    ("End Date", m.end_date.format("%Y-%m-%d").to_string()),
                    ("Observations", m.observations.to_string()),
                ],
            ),
            (
                "Returns",
                vec![
                    ("Total Return", value(m.total_return)),
                    ("Annualized Return (CAGR)", value(m.cagr)),
                ],
            ),
            ("Risk", vec![("Volatility (Ann.)", value(m.volatility))]),
            (
                "Drawdown",
                vec![
                    ("Max Drawdown", value(m.max_drawdown)),
                    ("Max Drawdown (%)", value(m.max_drawdown_pct)),
                    (
                        "Max DD Duration (periods)",
                        m.max_drawdown_duration.to_string(),
                    ),
                ],
            ),
            (
                "Risk-Adjusted Returns",
                vec![
                    ("Sharpe Ratio", value(m.sharpe)),
                    ("Sortino Ratio", value(m.sortino)),
                    ("Calmar Ratio", value(m.calmar)),
                    ("Win Rate", value(m.win_rate)),
                ],
            ),
        ];
        if let Some(b) = &m.benchmark {
            sections.push((
                "Benchmark-Relative",
                vec![
                    ("Benchmark Return (Ann.)", value(b.benchmark_cagr)),
                    ("Alpha (Ann.)", value(b.alpha)),
                    ("Beta", value(b.beta)),
                    ("Tracking Error (Ann.)", value(b.tracking_error)),
                    ("Information Ratio", value(b.information_ratio)),
                ],
            ));
        }

        let mut lines = vec![
            String::new(),
            "  PERFORMANCE SUMMARY".to_string(),
            format!("  {}", "=".repeat(WIDTH - 2)),
            String::new(),
        ];
        for (title, rows) in sections {
            lines.push(format!("  {title}"));
            lines.push(format!("  {}", "-".repeat(WIDTH - 2)));
            let label_w = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
            for (label, val) in rows {
                lines.push(format!("    {label:<label_w$}  {val}"));
            }
            lines.push(String::new());
        }
        lines.push(format!("  {}", "=".repeat(WIDTH - 2)));
        lines.join("\n")
    }
}

fn value(v: Option<f64>) -> String {
    match v {
        None => UNDEFINED.to_string(),
        Some(x) if !x.is_finite() => UNDEFINED.to_string(),
        Some(x) if x != 0.0 && x.abs() < 1e-4 => format!("{x:.3e}"),
        Some(x) if x.abs() >= 1e4 => thousands(x),
        Some(x) => format!("{x:.4}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BenchmarkMetrics;
    use chrono::NaiveDate;

    fn metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
            observations: 16,
            total_return: Some(0.0123),
            cagr: Some(0.2345),
            volatility: Some(0.18),
            sharpe: Some(1.5),
            sortino: None,
            max_drawdown: Some(-52_000.0),
            max_drawdown_pct: Some(-0.0052),
            max_drawdown_duration: 3,
            calmar: Some(45.09),
            win_rate: Some(0.5625),
            benchmark: None,
        }
    }

    #[test]
    fn renders_sections_and_undefined_values() {
        let text = PerformanceReportGenerator.generate(&metrics());
        assert!(text.contains("  PERFORMANCE SUMMARY"));
        assert!(text.contains("    Start Date    2026-01-09"));
        assert!(text.contains("    Total Return              0.0123"));
        assert!(text.contains("    Sortino Ratio  —"));
        assert!(text.contains("    Max Drawdown               -52,000.00"));
        assert!(text.contains("    Max DD Duration (periods)  3"));
        assert!(!text.contains("Benchmark-Relative"));
    }

    #[test]
    fn benchmark_section_appears_when_present() {
        let mut m = metrics();
        m.benchmark = Some(BenchmarkMetrics {
            benchmark_cagr: Some(0.1),
            alpha: Some(0.05),
            beta: Some(0.9),
            tracking_error: None,
            information_ratio: None,
        });
        let text = PerformanceReportGenerator.generate(&m);
        assert!(text.contains("  Benchmark-Relative"));
        assert!(text.contains("    Beta                     0.9000"));
        assert!(text.contains("    Information Ratio        —"));
    }

    #[test]
    fn tiny_values_use_scientific_notation() {
        assert_eq!(value(Some(0.00001234)), "1.234e-5");
        assert_eq!(value(Some(0.0)), "0.0000");
        assert_eq!(value(Some(f64::NAN)), "—");
    }
}
