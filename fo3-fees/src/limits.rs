//! Transfer limits and limit evaluation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Transfer limits snapshot for an account or account tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLimits {
    pub daily_limit: Decimal,
    pub weekly_limit: Decimal,
    pub monthly_limit: Decimal,
    pub per_transaction_limit: Decimal,
    pub minimum_amount: Decimal,
    pub maximum_amount: Decimal,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            daily_limit: Decimal::from(10000),
            weekly_limit: Decimal::from(50000),
            monthly_limit: Decimal::from(100000),
            per_transaction_limit: Decimal::from(5000),
            minimum_amount: Decimal::from(1),
            maximum_amount: Decimal::from(10000),
        }
    }
}

impl TransferLimits {
    /// Check the limits snapshot when it is loaded.
    ///
    /// `per_transaction_limit` above `maximum_amount` is legal but makes the
    /// per-transaction cap unreachable, so it is only logged.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("daily_limit", self.daily_limit),
            ("weekly_limit", self.weekly_limit),
            ("monthly_limit", self.monthly_limit),
            ("per_transaction_limit", self.per_transaction_limit),
            ("minimum_amount", self.minimum_amount),
            ("maximum_amount", self.maximum_amount),
        ];
        for (name, value) in fields {
            if value < Decimal::ZERO {
                return Err(Error::InvalidLimits(format!("{} cannot be negative", name)));
            }
        }

        if self.minimum_amount > self.maximum_amount {
            return Err(Error::InvalidLimits(format!(
                "minimum_amount {} exceeds maximum_amount {}",
                self.minimum_amount, self.maximum_amount
            )));
        }

        if self.per_transaction_limit > self.maximum_amount {
            warn!(
                per_transaction_limit = %self.per_transaction_limit,
                maximum_amount = %self.maximum_amount,
                "per-transaction limit is above the maximum amount and will never trigger"
            );
        }

        Ok(())
    }

    /// How much more can be transferred in each window given `spent`.
    /// Windows already over their cap report zero; a difference too large
    /// to represent saturates at `Decimal::MAX`.
    pub fn remaining(&self, spent: &SpendingTotals) -> SpendingTotals {
        let left = |limit: Decimal, used: Decimal| {
            limit
                .checked_sub(used)
                .unwrap_or(Decimal::MAX)
                .max(Decimal::ZERO)
        };
        SpendingTotals {
            daily: left(self.daily_limit, spent.daily),
            weekly: left(self.weekly_limit, spent.weekly),
            monthly: left(self.monthly_limit, spent.monthly),
        }
    }
}

/// Amounts already transferred in each rolling window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingTotals {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
}

impl SpendingTotals {
    pub fn new(daily: Decimal, weekly: Decimal, monthly: Decimal) -> Self {
        Self { daily, weekly, monthly }
    }
}

/// Reason a transfer amount was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitViolation {
    BelowMinimum,
    AboveMaximum,
    AbovePerTransaction,
    DailyLimitExceeded,
    WeeklyLimitExceeded,
    MonthlyLimitExceeded,
}

impl LimitViolation {
    /// The configured limit that was breached
    pub fn limit_value(&self, limits: &TransferLimits) -> Decimal {
        match self {
            LimitViolation::BelowMinimum => limits.minimum_amount,
            LimitViolation::AboveMaximum => limits.maximum_amount,
            LimitViolation::AbovePerTransaction => limits.per_transaction_limit,
            LimitViolation::DailyLimitExceeded => limits.daily_limit,
            LimitViolation::WeeklyLimitExceeded => limits.weekly_limit,
            LimitViolation::MonthlyLimitExceeded => limits.monthly_limit,
        }
    }

    /// User-facing message naming the breached limit
    pub fn describe(&self, limits: &TransferLimits) -> String {
        let limit = self.limit_value(limits);
        match self {
            LimitViolation::BelowMinimum => format!("Amount is below the minimum transfer amount: {}", limit),
            LimitViolation::AboveMaximum => format!("Amount exceeds the maximum transfer amount: {}", limit),
            LimitViolation::AbovePerTransaction => format!("Amount exceeds per-transaction limit: {}", limit),
            LimitViolation::DailyLimitExceeded => format!("Amount would exceed daily limit: {}", limit),
            LimitViolation::WeeklyLimitExceeded => format!("Amount would exceed weekly limit: {}", limit),
            LimitViolation::MonthlyLimitExceeded => format!("Amount would exceed monthly limit: {}", limit),
        }
    }
}

impl std::fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitViolation::BelowMinimum => write!(f, "below_minimum"),
            LimitViolation::AboveMaximum => write!(f, "above_maximum"),
            LimitViolation::AbovePerTransaction => write!(f, "above_per_transaction"),
            LimitViolation::DailyLimitExceeded => write!(f, "daily_limit_exceeded"),
            LimitViolation::WeeklyLimitExceeded => write!(f, "weekly_limit_exceeded"),
            LimitViolation::MonthlyLimitExceeded => write!(f, "monthly_limit_exceeded"),
        }
    }
}

/// Outcome of a limit evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum LimitCheckResult {
    Allowed,
    Rejected(LimitViolation),
}

impl LimitCheckResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitCheckResult::Allowed)
    }

    pub fn violation(&self) -> Option<LimitViolation> {
        match self {
            LimitCheckResult::Allowed => None,
            LimitCheckResult::Rejected(reason) => Some(*reason),
        }
    }
}

/// Evaluate a proposed transfer `amount` against `limits`.
///
/// Checks run in a fixed order and the first violation is returned:
/// minimum, maximum, per-transaction, daily, weekly, monthly. Window checks
/// add `amount` to the caller-supplied `spent` totals. A non-positive amount
/// or a negative spending total is a caller error, not a limit breach.
pub fn evaluate_limits(
    limits: &TransferLimits,
    amount: Decimal,
    spent: &SpendingTotals,
) -> Result<LimitCheckResult> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidArgument(format!(
            "transfer amount must be positive, got {}",
            amount
        )));
    }

    if spent.daily < Decimal::ZERO || spent.weekly < Decimal::ZERO || spent.monthly < Decimal::ZERO {
        return Err(Error::InvalidArgument(format!(
            "spending totals cannot be negative, got {:?}",
            spent
        )));
    }

    // A window sum too large to represent is over any cap.
    let exceeds = |used: Decimal, limit: Decimal| used.checked_add(amount).map_or(true, |total| total > limit);

    let result = if amount < limits.minimum_amount {
        LimitCheckResult::Rejected(LimitViolation::BelowMinimum)
    } else if amount > limits.maximum_amount {
        LimitCheckResult::Rejected(LimitViolation::AboveMaximum)
    } else if amount > limits.per_transaction_limit {
        LimitCheckResult::Rejected(LimitViolation::AbovePerTransaction)
    } else if exceeds(spent.daily, limits.daily_limit) {
        LimitCheckResult::Rejected(LimitViolation::DailyLimitExceeded)
    } else if exceeds(spent.weekly, limits.weekly_limit) {
        LimitCheckResult::Rejected(LimitViolation::WeeklyLimitExceeded)
    } else if exceeds(spent.monthly, limits.monthly_limit) {
        LimitCheckResult::Rejected(LimitViolation::MonthlyLimitExceeded)
    } else {
        LimitCheckResult::Allowed
    };

    debug!(%amount, ?result, "Evaluated transfer limits");
    Ok(result)
}
