//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! initial_cash = 10_000_000.0
//! as_of = "2026-01-30"          # optional, defaults to today
//! name = "csi500-weekly"        # optional
//!
//! [data]
//! schedule_path = "schedule.csv"
//! market_data_dir = "bars"
//! index_data_dir = "index"      # optional
//! benchmark_symbol = "000905.SH" # optional
//!
//! [fees]
//! path = "fees.json"
//!
//! [output]
//! dir = "results"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use navsim_core::fees::FeeConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub backtest: BacktestSection,
    pub data: DataSection,
    pub fees: FeesSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub initial_cash: f64,
    /// Last day to simulate. `None` means today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub name: Option<String>,
    /// Annual rate subtracted from returns in Sharpe and Sortino.
    #[serde(default)]
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSection {
    pub schedule_path: PathBuf,
    pub market_data_dir: PathBuf,
    #[serde(default)]
    pub index_data_dir: Option<PathBuf>,
    #[serde(default)]
    pub benchmark_symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeesSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    pub dir: PathBuf,
}

/// What a run id is hashed over. The output directory is left out so the
/// same run written to two places keeps one id.
#[derive(Serialize)]
struct Fingerprint<'a> {
    initial_cash: f64,
    as_of: NaiveDate,
    risk_free_rate: f64,
    data: &'a DataSection,
    fees: &'a FeeConfig,
}

impl RunConfig {
    /// Parse and validate without touching paths.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, resolving relative paths against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cash = self.backtest.initial_cash;
        if !cash.is_finite() || cash <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_cash must be positive and finite, got {cash}"
            )));
        }
        if !self.backtest.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid("risk_free_rate must be finite".into()));
        }
        let required = [
            ("data.schedule_path", &self.data.schedule_path),
            ("data.market_data_dir", &self.data.market_data_dir),
            ("fees.path", &self.fees.path),
            ("output.dir", &self.output.dir),
        ];
        for (field, value) in required {
            if value.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if let Some(symbol) = &self.data.benchmark_symbol {
            if symbol.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "data.benchmark_symbol must not be blank".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.data.schedule_path);
        join(&mut self.data.market_data_dir);
        if let Some(dir) = self.data.index_data_dir.as_mut() {
            join(dir);
        }
        join(&mut self.fees.path);
        join(&mut self.output.dir);
    }

    /// Benchmark directory and symbol, when both are configured.
    pub fn benchmark(&self) -> Option<(&Path, &str)> {
        match (&self.data.index_data_dir, &self.data.benchmark_symbol) {
            (Some(dir), Some(symbol)) => Some((dir.as_path(), symbol.as_str())),
            _ => None,
        }
    }

    /// Deterministic BLAKE3 id over the run inputs and fee schedules.
    pub fn run_id(&self, as_of: NaiveDate, fees: &FeeConfig) -> Result<RunId, ConfigError> {
        let fingerprint = Fingerprint {
            initial_cash: self.backtest.initial_cash,
            as_of,
            risk_free_rate: self.backtest.risk_free_rate,
            data: &self.data,
            fees,
        };
        let json = serde_json::to_string(&fingerprint)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[backtest]
initial_cash = 10000000.0
as_of = "2026-01-30"
name = "weekly"

[data]
schedule_path = "schedule.csv"
market_data_dir = "bars"
index_data_dir = "index"
benchmark_symbol = "000905.SH"

[fees]
path = "fees.json"

[output]
dir = "results"
"#;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 30).unwrap()
    }

    #[test]
    fn parses_all_sections() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.backtest.initial_cash, 10_000_000.0);
        assert_eq!(config.backtest.as_of, Some(as_of()));
        assert_eq!(config.backtest.name.as_deref(), Some("weekly"));
        assert_eq!(config.backtest.risk_free_rate, 0.0);
        assert_eq!(config.benchmark(), Some((Path::new("index"), "000905.SH")));
    }

    #[test]
    fn optional_fields_default_to_none() {
        let raw = r#"
[backtest]
initial_cash = 1.0
[data]
schedule_path = "s.csv"
market_data_dir = "bars"
[fees]
path = "f.json"
[output]
dir = "out"
"#;
        let config = RunConfig::from_toml_str(raw).unwrap();
        assert!(config.backtest.as_of.is_none());
        assert!(config.benchmark().is_none());
    }

    #[test]
    fn rejects_non_positive_cash() {
        let raw = SAMPLE.replace("10000000.0", "0.0");
        assert!(matches!(
            RunConfig::from_toml_str(&raw),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_empty_paths() {
        let raw = SAMPLE.replace("\"fees.json\"", "\"\"");
        let err = RunConfig::from_toml_str(&raw).unwrap_err();
        assert!(err.to_string().contains("fees.path"));
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let mut config = RunConfig::from_toml_str(SAMPLE).unwrap();
        config.resolve_relative_to(Path::new("/srv/navsim"));
        assert_eq!(config.data.schedule_path, Path::new("/srv/navsim/schedule.csv"));
        assert_eq!(
            config.data.index_data_dir.as_deref(),
            Some(Path::new("/srv/navsim/index"))
        );
        assert_eq!(config.output.dir, Path::new("/srv/navsim/results"));
    }

    #[test]
    fn run_id_is_deterministic() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        let fees = FeeConfig::reference();
        let id1 = config.run_id(as_of(), &fees).unwrap();
        let id2 = config.run_id(as_of(), &fees).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn run_id_tracks_inputs_but_not_output_dir() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        let fees = FeeConfig::reference();
        let base = config.run_id(as_of(), &fees).unwrap();

        let mut moved = config.clone();
        moved.output.dir = PathBuf::from("elsewhere");
        assert_eq!(moved.run_id(as_of(), &fees).unwrap(), base);

        let mut richer = config.clone();
        richer.backtest.initial_cash = 20_000_000.0;
        assert_ne!(richer.run_id(as_of(), &fees).unwrap(), base);

        let mut cheaper = fees;
        cheaper.buy.commission_rate = 0.0001;
        assert_ne!(config.run_id(as_of(), &cheaper).unwrap(), base);

        let later = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        assert_ne!(config.run_id(later, &fees).unwrap(), base);
    }
}
