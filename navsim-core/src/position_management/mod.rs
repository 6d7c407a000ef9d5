/// Position management: fee-aware lot allocation and trade valuation
///
/// **Module Structure:**
/// - `allocation`: equal-weight, lot-rounded allocation with top-up rounds
/// - `manager`: PositionManager (buy/sell schedules, total cost, net proceeds)
pub mod allocation;
pub mod manager;

pub use allocation::{Allocation, MAX_TOPUP_ROUNDS};
pub use manager::PositionManager;
