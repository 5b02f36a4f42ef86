//! FO3 Wallet Fees - Transfer fee quoting and limit evaluation
//!
//! This library prices wallet-to-wallet transfers under a configured fee
//! policy (fixed, percentage or tiered) and decides whether a proposed
//! transfer fits the per-transaction bounds and the daily, weekly and monthly
//! caps of an account. Everything here is pure computation over values the
//! caller already fetched; nothing performs I/O except the configuration
//! loader.

pub mod error;
pub mod policy;
pub mod limits;
pub mod engine;
pub mod config;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use policy::{FeePolicy, FeeType, TierRange};
pub use limits::{evaluate_limits, LimitCheckResult, LimitViolation, SpendingTotals, TransferLimits};
pub use engine::{calculate_fee, quote_transfer, FeeBreakdown, TransferFeeCalculation};
pub use config::FeeConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_set() {
        assert!(!super::VERSION.is_empty());
    }
}
