//! Domain types for NavSim

pub mod dates;
pub mod exchange;
pub mod ledger;
pub mod market;
pub mod position;

pub use exchange::Exchange;
pub use ledger::LedgerAccount;
pub use market::{MarketData, MarketSnapshot};
pub use position::{Position, StuckCause, LOT_SIZE};
