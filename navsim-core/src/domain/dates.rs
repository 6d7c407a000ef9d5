//! Calendar helpers shared by the schedule loader, the engine and reporting.
//!
//! Dates travel through files in two spellings, `YYYYMMDD` and `YYYY-MM-DD`.
//! Suspension fields additionally use `0` or an empty cell for "no value".

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer};

const COMPACT: &str = "%Y%m%d";
const ISO: &str = "%Y-%m-%d";

/// Parse a `YYYYMMDD` or `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, COMPACT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO))
        .ok()
}

/// Parse an optional date field where `0` and the empty string mean absent.
///
/// Returns `Err(raw)` for a non-empty value that is not a date.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_date(trimmed)
        .map(Some)
        .ok_or_else(|| trimmed.to_string())
}

/// Render a date as the `YYYYMMDD` key used by equity histories.
pub fn date_key(date: NaiveDate) -> String {
    date.format(COMPACT).to_string()
}

/// The Mon–Fri day strictly before `date`.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date - Duration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day -= Duration::days(1);
    }
    day
}

/// Serde adapter for a required date in either spelling.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

/// Serde adapter for an optional date with `0`/empty as none.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_optional_date(&raw)
            .map_err(|bad| serde::de::Error::custom(format!("invalid date '{bad}'"))),
    }
}
