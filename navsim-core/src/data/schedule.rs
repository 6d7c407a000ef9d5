//! Trading schedule: one row per symbol per calendar day, grouped by day.
//!
//! CSV header:
//! `daily_date,symbol,first_trading_day,last_trading_day,upper_limit_price,
//! lower_limit_price,suspension_start,suspension_end,suspension_end_last_tradeable_date`

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::dates::{deserialize_date, deserialize_optional_date};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to open schedule {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schedule CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("rows for {date} disagree on first/last trading day flags")]
    InconsistentFlags { date: NaiveDate },

    #[error("schedule contains no rows")]
    Empty,
}

/// One schedule row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingDayRow {
    #[serde(deserialize_with = "deserialize_date")]
    pub daily_date: NaiveDate,
    pub symbol: String,
    pub first_trading_day: u8,
    pub last_trading_day: u8,
    #[serde(default)]
    pub upper_limit_price: Option<f64>,
    #[serde(default)]
    pub lower_limit_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub suspension_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub suspension_end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub suspension_end_last_tradeable_date: Option<NaiveDate>,
}

impl TradingDayRow {
    /// Any suspension annotation counts, start or end.
    pub fn is_suspended(&self) -> bool {
        self.suspension_start.is_some() || self.suspension_end.is_some()
    }

    /// Open at or above the upper limit: the stock cannot be bought.
    pub fn is_locked_up(&self, open: f64) -> bool {
        self.upper_limit_price.is_some_and(|limit| open >= limit)
    }

    /// Close at or below the lower limit: the stock cannot be sold.
    pub fn is_locked_down(&self, close: f64) -> bool {
        self.lower_limit_price.is_some_and(|limit| close <= limit)
    }
}

/// All rows of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub first_trading_day: u8,
    pub last_trading_day: u8,
    pub rows: Vec<TradingDayRow>,
}

impl ScheduleDay {
    pub fn row(&self, symbol: &str) -> Option<&TradingDayRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.symbol.as_str())
    }
}

/// Days in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingSchedule {
    days: Vec<ScheduleDay>,
}

impl TradingSchedule {
    /// Group rows by date. Row order inside a day is preserved.
    pub fn from_rows(rows: Vec<TradingDayRow>) -> Result<Self, ScheduleError> {
        if rows.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let mut grouped: BTreeMap<NaiveDate, Vec<TradingDayRow>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.daily_date).or_default().push(row);
        }

        let days = grouped
            .into_iter()
            .map(|(date, rows)| {
                let first = rows[0].first_trading_day;
                let last = rows[0].last_trading_day;
                if rows
                    .iter()
                    .any(|r| r.first_trading_day != first || r.last_trading_day != last)
                {
                    return Err(ScheduleError::InconsistentFlags { date });
                }
                Ok(ScheduleDay {
                    date,
                    first_trading_day: first,
                    last_trading_day: last,
                    rows,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { days })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScheduleError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = rdr
            .deserialize()
            .collect::<Result<Vec<TradingDayRow>, csv::Error>>()?;
        Self::from_rows(rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, ScheduleError> {
        let file = std::fs::File::open(path).map_err(|source| ScheduleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Drop every day after `as_of`.
    pub fn truncate_after(mut self, as_of: NaiveDate) -> Self {
        self.days.retain(|d| d.date <= as_of);
        self
    }

    pub fn days(&self) -> &[ScheduleDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }
}
