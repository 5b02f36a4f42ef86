//! Fee policy data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Fee computation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Fixed,
    Percentage,
    Tiered,
}

impl std::fmt::Display for FeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeType::Fixed => write!(f, "fixed"),
            FeeType::Percentage => write!(f, "percentage"),
            FeeType::Tiered => write!(f, "tiered"),
        }
    }
}

impl std::str::FromStr for FeeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(FeeType::Fixed),
            "percentage" => Ok(FeeType::Percentage),
            "tiered" => Ok(FeeType::Tiered),
            _ => Err(format!("Invalid fee type: {}", s)),
        }
    }
}

/// One band of a tiered fee schedule.
///
/// The band covers `min..=max`; a missing `max` leaves it unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange {
    pub min: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    pub fee: Decimal,
}

impl TierRange {
    pub fn new(min: Decimal, max: Option<Decimal>, fee: Decimal) -> Self {
        Self { min, max, fee }
    }

    /// Whether `amount` falls inside this band
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && self.max.map_or(true, |max| amount <= max)
    }
}

/// Fee policy entity
///
/// Exactly one of `fixed_amount`, `percentage_rate` and `tier_ranges` is
/// expected to be populated, matching `fee_type`. [`FeePolicy::validate`]
/// enforces that shape; fee evaluation itself tolerates a malformed policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub id: Uuid,
    pub fee_name: String,
    pub fee_type: FeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_ranges: Option<Vec<TierRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_fee: Option<Decimal>,
    pub currency: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl FeePolicy {
    fn base(fee_name: impl Into<String>, fee_type: FeeType, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fee_name: fee_name.into(),
            fee_type,
            fixed_amount: None,
            percentage_rate: None,
            tier_ranges: None,
            minimum_fee: None,
            maximum_fee: None,
            currency: currency.into(),
            is_active: true,
            effective_from: None,
            effective_until: None,
        }
    }

    /// Create a flat fee policy charging `amount` on every transfer
    pub fn fixed(fee_name: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            fixed_amount: Some(amount),
            ..Self::base(fee_name, FeeType::Fixed, currency)
        }
    }

    /// Create a policy charging `rate` (a fraction, 0.02 = 2%) of the amount
    pub fn percentage(fee_name: impl Into<String>, rate: Decimal, currency: impl Into<String>) -> Self {
        Self {
            percentage_rate: Some(rate),
            ..Self::base(fee_name, FeeType::Percentage, currency)
        }
    }

    /// Create a tiered policy; tiers are matched in the order given
    pub fn tiered(fee_name: impl Into<String>, tiers: Vec<TierRange>, currency: impl Into<String>) -> Self {
        Self {
            tier_ranges: Some(tiers),
            ..Self::base(fee_name, FeeType::Tiered, currency)
        }
    }

    pub fn with_minimum_fee(mut self, minimum_fee: Decimal) -> Self {
        self.minimum_fee = Some(minimum_fee);
        self
    }

    pub fn with_maximum_fee(mut self, maximum_fee: Decimal) -> Self {
        self.maximum_fee = Some(maximum_fee);
        self
    }

    pub fn with_effective_window(
        mut self,
        effective_from: Option<DateTime<Utc>>,
        effective_until: Option<DateTime<Utc>>,
    ) -> Self {
        self.effective_from = effective_from;
        self.effective_until = effective_until;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether the policy applies at `now`.
    ///
    /// The window is half-open: `effective_from` is inclusive and
    /// `effective_until` is exclusive. Missing bounds are open.
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.effective_from.map_or(true, |from| now >= from)
            && self.effective_until.map_or(true, |until| now < until)
    }

    /// Check the policy shape and value ranges.
    ///
    /// Called when configuration is loaded so that fee evaluation can work
    /// on typed, already-checked data. Overlapping tiers are accepted; the
    /// first matching tier wins at evaluation time.
    pub fn validate(&self) -> Result<()> {
        let populated = (
            self.fixed_amount.is_some(),
            self.percentage_rate.is_some(),
            self.tier_ranges.is_some(),
        );
        let expected = match self.fee_type {
            FeeType::Fixed => (true, false, false),
            FeeType::Percentage => (false, true, false),
            FeeType::Tiered => (false, false, true),
        };
        if populated != expected {
            return Err(self.invalid(format!(
                "{} policy must set exactly the {} field",
                self.fee_type,
                match self.fee_type {
                    FeeType::Fixed => "fixed_amount",
                    FeeType::Percentage => "percentage_rate",
                    FeeType::Tiered => "tier_ranges",
                }
            )));
        }

        if let Some(amount) = self.fixed_amount {
            if amount < Decimal::ZERO {
                return Err(self.invalid("fixed_amount cannot be negative"));
            }
        }

        if let Some(rate) = self.percentage_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(self.invalid("percentage_rate must be between 0 and 1"));
            }
        }

        if let Some(tiers) = &self.tier_ranges {
            for (index, tier) in tiers.iter().enumerate() {
                if tier.min < Decimal::ZERO || tier.fee < Decimal::ZERO {
                    return Err(self.invalid(format!("tier {} has a negative bound or fee", index)));
                }
                if let Some(max) = tier.max {
                    if max < tier.min {
                        return Err(self.invalid(format!("tier {} has max below min", index)));
                    }
                }
            }
        }

        for (label, clamp) in [("minimum_fee", self.minimum_fee), ("maximum_fee", self.maximum_fee)] {
            if clamp.map_or(false, |value| value < Decimal::ZERO) {
                return Err(self.invalid(format!("{} cannot be negative", label)));
            }
        }
        if let (Some(min), Some(max)) = (self.minimum_fee, self.maximum_fee) {
            if min > max {
                return Err(self.invalid("minimum_fee exceeds maximum_fee"));
            }
        }

        if let (Some(from), Some(until)) = (self.effective_from, self.effective_until) {
            if from >= until {
                return Err(self.invalid("effective_from must be before effective_until"));
            }
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(self.invalid(format!("currency code '{}' must be 3 letters", self.currency)));
        }

        Ok(())
    }

    fn invalid(&self, reason: impl std::fmt::Display) -> Error {
        Error::InvalidPolicy(format!("{} ({}): {}", self.fee_name, self.id, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_fee_type_string_round_trip() {
        for fee_type in [FeeType::Fixed, FeeType::Percentage, FeeType::Tiered] {
            assert_eq!(FeeType::from_str(&fee_type.to_string()).unwrap(), fee_type);
        }
        assert!(FeeType::from_str("flat").is_err());
    }

    #[test]
    fn test_tier_range_bounds_are_inclusive() {
        let tier = TierRange::new(dec("10"), Some(dec("20")), dec("1"));
        assert!(tier.contains(dec("10")));
        assert!(tier.contains(dec("20")));
        assert!(!tier.contains(dec("9.99")));
        assert!(!tier.contains(dec("20.01")));

        let open = TierRange::new(dec("20"), None, dec("2"));
        assert!(open.contains(dec("1000000")));
    }

    #[test]
    fn test_effective_window_is_half_open() {
        let now = Utc::now();
        let policy = FeePolicy::fixed("Transfer fee", dec("1"), "USD")
            .with_effective_window(Some(now), Some(now + Duration::days(1)));

        assert!(policy.is_effective(now));
        assert!(policy.is_effective(now + Duration::hours(23)));
        assert!(!policy.is_effective(now + Duration::days(1)));
        assert!(!policy.is_effective(now - Duration::seconds(1)));
    }

    #[test]
    fn test_inactive_policy_is_never_effective() {
        let policy = FeePolicy::fixed("Transfer fee", dec("1"), "USD").deactivated();
        assert!(!policy.is_effective(Utc::now()));
    }

    #[test]
    fn test_validate_accepts_well_formed_policies() {
        FeePolicy::fixed("Flat", dec("1.00"), "USD").validate().unwrap();
        FeePolicy::percentage("Pct", dec("0.02"), "EUR")
            .with_minimum_fee(dec("0.50"))
            .with_maximum_fee(dec("10"))
            .validate()
            .unwrap();
        FeePolicy::tiered(
            "Tiers",
            vec![
                TierRange::new(dec("0"), Some(dec("100")), dec("1")),
                TierRange::new(dec("50"), None, dec("2")),
            ],
            "GBP",
        )
        .validate()
        .unwrap();
    }

    #[test]
    fn test_validate_rejects_shape_mismatch() {
        let mut policy = FeePolicy::fixed("Flat", dec("1"), "USD");
        policy.percentage_rate = Some(dec("0.01"));
        assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));

        let mut policy = FeePolicy::tiered("Tiers", vec![], "USD");
        policy.tier_ranges = None;
        assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(FeePolicy::fixed("Flat", dec("-1"), "USD").validate().is_err());
        assert!(FeePolicy::percentage("Pct", dec("1.5"), "USD").validate().is_err());
        assert!(FeePolicy::fixed("Flat", dec("1"), "US").validate().is_err());
        assert!(FeePolicy::fixed("Flat", dec("1"), "USD")
            .with_minimum_fee(dec("5"))
            .with_maximum_fee(dec("2"))
            .validate()
            .is_err());
        assert!(FeePolicy::tiered(
            "Tiers",
            vec![TierRange::new(dec("100"), Some(dec("50")), dec("1"))],
            "USD",
        )
        .validate()
        .is_err());

        let now = Utc::now();
        assert!(FeePolicy::fixed("Flat", dec("1"), "USD")
            .with_effective_window(Some(now), Some(now))
            .validate()
            .is_err());
    }

    #[test]
    fn test_policy_deserializes_from_config_json() {
        let json = r#"{
            "id": "4f1c2a8e-7c1b-4c5e-9a3e-2d7f6b8a9c01",
            "fee_name": "Wallet transfer",
            "fee_type": "tiered",
            "tier_ranges": [
                {"min": "0", "max": "100", "fee": "1.00"},
                {"min": "100", "fee": "2.00"}
            ],
            "currency": "USD"
        }"#;

        let policy: FeePolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.fee_type, FeeType::Tiered);
        assert!(policy.is_active);
        let tiers = policy.tier_ranges.as_ref().unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].max, None);
        policy.validate().unwrap();
    }
}
