//! Immutable fee schedules and the JSON fee file.
//!
//! File shape:
//!
//! ```json
//! { "fees": {
//!     "buy":  { "commission_rate": 0.00025, "csrc_fee_rate": 0.00002, ... },
//!     "sell": { ..., "stamp_tax_rate": 0.0005 },
//!     "operational": { "management_fee_rate": ..., "tax_fee_rate": ... } } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeeConfigError {
    #[error("failed to read fee file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fee JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fee rate {schedule}.{field} = {value}: must be finite and non-negative")]
    InvalidRate {
        schedule: &'static str,
        field: &'static str,
        value: f64,
    },
}

fn check(schedule: &'static str, field: &'static str, value: f64) -> Result<(), FeeConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FeeConfigError::InvalidRate {
            schedule,
            field,
            value,
        })
    }
}

/// Buy-side rates. No stamp tax on buys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyFeeSchedule {
    pub commission_rate: f64,
    pub csrc_fee_rate: f64,
    pub handling_fee_rate: f64,
    pub transfer_fee_rate_sh: f64,
    pub min_fee: f64,
}

impl BuyFeeSchedule {
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        check("buy", "commission_rate", self.commission_rate)?;
        check("buy", "csrc_fee_rate", self.csrc_fee_rate)?;
        check("buy", "handling_fee_rate", self.handling_fee_rate)?;
        check("buy", "transfer_fee_rate_sh", self.transfer_fee_rate_sh)?;
        check("buy", "min_fee", self.min_fee)
    }

    /// Commission + CSRC + handling: the part subject to the minimum.
    pub fn base_rate(&self) -> f64 {
        self.commission_rate + self.csrc_fee_rate + self.handling_fee_rate
    }
}

/// Sell-side rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellFeeSchedule {
    pub commission_rate: f64,
    pub csrc_fee_rate: f64,
    pub handling_fee_rate: f64,
    pub stamp_tax_rate: f64,
    pub transfer_fee_rate_sh: f64,
    pub min_fee: f64,
}

impl SellFeeSchedule {
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        check("sell", "commission_rate", self.commission_rate)?;
        check("sell", "csrc_fee_rate", self.csrc_fee_rate)?;
        check("sell", "handling_fee_rate", self.handling_fee_rate)?;
        check("sell", "stamp_tax_rate", self.stamp_tax_rate)?;
        check("sell", "transfer_fee_rate_sh", self.transfer_fee_rate_sh)?;
        check("sell", "min_fee", self.min_fee)
    }

    pub fn base_rate(&self) -> f64 {
        self.commission_rate + self.csrc_fee_rate + self.handling_fee_rate
    }
}

/// Daily operating-expense rates applied to yesterday's NAV, plus the
/// capital-gains tax rate applied to realized gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiabilityFeeSchedule {
    pub management_fee_rate: f64,
    pub custodian_fee_rate: f64,
    pub administration_services_fee_rate: f64,
    pub tax_fee_rate: f64,
}

impl LiabilityFeeSchedule {
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        check("operational", "management_fee_rate", self.management_fee_rate)?;
        check("operational", "custodian_fee_rate", self.custodian_fee_rate)?;
        check(
            "operational",
            "administration_services_fee_rate",
            self.administration_services_fee_rate,
        )?;
        check("operational", "tax_fee_rate", self.tax_fee_rate)
    }

    pub fn daily_operating_rate(&self) -> f64 {
        self.management_fee_rate + self.custodian_fee_rate + self.administration_services_fee_rate
    }
}

/// All three schedules, validated. Loaded once per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub buy: BuyFeeSchedule,
    pub sell: SellFeeSchedule,
    pub operational: LiabilityFeeSchedule,
}

#[derive(Deserialize)]
struct FeeFile {
    fees: FeeConfig,
}

impl FeeConfig {
    pub fn new(
        buy: BuyFeeSchedule,
        sell: SellFeeSchedule,
        operational: LiabilityFeeSchedule,
    ) -> Result<Self, FeeConfigError> {
        let cfg = Self {
            buy,
            sell,
            operational,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FeeConfigError> {
        self.buy.validate()?;
        self.sell.validate()?;
        self.operational.validate()
    }

    /// Parse the `{"fees": {...}}` document.
    pub fn from_json(json: &str) -> Result<Self, FeeConfigError> {
        let file: FeeFile = serde_json::from_str(json)?;
        file.fees.validate()?;
        Ok(file.fees)
    }

    pub fn from_path(path: &Path) -> Result<Self, FeeConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| FeeConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Buy schedule used by the reference scenarios; sell side adds 0.05% stamp tax.
    pub fn reference() -> Self {
        Self {
            buy: BuyFeeSchedule {
                commission_rate: 0.00025,
                csrc_fee_rate: 0.00002,
                handling_fee_rate: 0.0000341,
                transfer_fee_rate_sh: 0.00001,
                min_fee: 5.0,
            },
            sell: SellFeeSchedule {
                commission_rate: 0.00025,
                csrc_fee_rate: 0.00002,
                handling_fee_rate: 0.0000341,
                stamp_tax_rate: 0.0005,
                transfer_fee_rate_sh: 0.00001,
                min_fee: 5.0,
            },
            operational: LiabilityFeeSchedule {
                management_fee_rate: 0.0,
                custodian_fee_rate: 0.0,
                administration_services_fee_rate: 0.0,
                tax_fee_rate: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "fees": {
            "buy": {
                "commission_rate": 0.00025,
                "csrc_fee_rate": 0.00002,
                "handling_fee_rate": 0.0000341,
                "transfer_fee_rate_sh": 0.00001,
                "min_fee": 5.0
            },
            "sell": {
                "commission_rate": 0.00025,
                "csrc_fee_rate": 0.00002,
                "handling_fee_rate": 0.0000341,
                "stamp_tax_rate": 0.0005,
                "transfer_fee_rate_sh": 0.00001,
                "min_fee": 5.0
            },
            "operational": {
                "management_fee_rate": 0.00002,
                "custodian_fee_rate": 0.000005,
                "administration_services_fee_rate": 0.000001,
                "tax_fee_rate": 0.1
            }
        }
    }"#;

    #[test]
    fn parses_fee_file() {
        let cfg = FeeConfig::from_json(SAMPLE).unwrap();
        assert_eq!(cfg.buy.min_fee, 5.0);
        assert_eq!(cfg.sell.stamp_tax_rate, 0.0005);
        assert_eq!(cfg.operational.tax_fee_rate, 0.1);
        assert!((cfg.operational.daily_operating_rate() - 0.000026).abs() < 1e-15);
    }

    #[test]
    fn missing_section_is_parse_error() {
        let err = FeeConfig::from_json(r#"{"fees": {"buy": {}}}"#).unwrap_err();
        assert!(matches!(err, FeeConfigError::Parse(_)));
    }

    #[test]
    fn negative_rate_rejected() {
        let mut doc: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        doc["fees"]["buy"]["min_fee"] = serde_json::json!(-1.0);
        let err = FeeConfig::from_json(&doc.to_string()).unwrap_err();
        match err {
            FeeConfigError::InvalidRate {
                schedule, field, ..
            } => {
                assert_eq!(schedule, "buy");
                assert_eq!(field, "min_fee");
            }
            other => panic!("expected InvalidRate, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_rate_rejected() {
        let mut buy = FeeConfig::reference().buy;
        buy.commission_rate = f64::NAN;
        assert!(buy.validate().is_err());
    }

    #[test]
    fn reference_schedule_is_valid() {
        assert!(FeeConfig::reference().validate().is_ok());
    }
}
