use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Listing venue, derived from the symbol suffix.
///
/// Only the Shanghai venue charges the transfer fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Sh,
    Sz,
}

impl Exchange {
    /// `600519.SH`, `600519.sse` → Sh; `000001.SZ`, `000001.SZSE` → Sz.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let (_, suffix) = symbol.trim().rsplit_once('.')?;
        match suffix.to_ascii_uppercase().as_str() {
            "SH" | "SSE" => Some(Exchange::Sh),
            "SZ" | "SZSE" => Some(Exchange::Sz),
            _ => None,
        }
    }

    /// Like [`Exchange::from_symbol`] but an unknown suffix is a hard error.
    pub fn resolve(symbol: &str) -> Result<Self, EngineError> {
        Self::from_symbol(symbol).ok_or_else(|| EngineError::UnresolvedExchange {
            symbol: symbol.to_string(),
        })
    }

    pub fn is_shanghai(self) -> bool {
        self == Exchange::Sh
    }
}
