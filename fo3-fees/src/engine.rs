//! Fee engine
//!
//! Pure functions pricing a transfer under a [`FeePolicy`]. The engine never
//! checks whether a policy is effective; selecting the policy for the current
//! time is the caller's job (see [`crate::config::FeeConfig::effective_policy`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::policy::{FeePolicy, FeeType};

/// Fee line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub name: String,
    pub fee_type: FeeType,
    pub amount: Decimal,
}

/// Fee quote for a single transfer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFeeCalculation {
    pub policy_id: Uuid,
    pub currency: String,
    pub amount: Decimal,
    pub transfer_fee: Decimal,
    pub net_amount: Decimal,
    pub fee_breakdown: Vec<FeeBreakdown>,
}

/// Compute the fee for `amount` under `policy`.
///
/// A policy missing its type-specific field, or a tiered policy where no
/// tier matches, prices the transfer at zero before clamping. A percentage
/// product too large to represent saturates at `Decimal::MAX` (or
/// `Decimal::MIN` for a negative product) before clamping.
pub fn calculate_fee(policy: &FeePolicy, amount: Decimal) -> Decimal {
    let raw = match policy.fee_type {
        FeeType::Fixed => policy.fixed_amount.unwrap_or(Decimal::ZERO),
        FeeType::Percentage => policy
            .percentage_rate
            .map_or(Decimal::ZERO, |rate| saturating_mul(amount, rate)),
        FeeType::Tiered => policy
            .tier_ranges
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|tier| tier.contains(amount))
            .map_or(Decimal::ZERO, |tier| tier.fee),
    };

    let fee = clamp_fee(policy, raw);
    debug!(
        policy_id = %policy.id,
        fee_type = %policy.fee_type,
        %amount,
        %raw,
        %fee,
        "Calculated transfer fee"
    );
    fee
}

fn saturating_mul(amount: Decimal, rate: Decimal) -> Decimal {
    amount.checked_mul(rate).unwrap_or_else(|| {
        if amount.is_sign_negative() != rate.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

fn clamp_fee(policy: &FeePolicy, raw: Decimal) -> Decimal {
    let mut fee = raw;
    if let Some(minimum) = policy.minimum_fee {
        if fee < minimum {
            fee = minimum;
        }
    }
    if let Some(maximum) = policy.maximum_fee {
        if fee > maximum {
            fee = maximum;
        }
    }
    fee
}

/// Quote a transfer: the fee, the amount the recipient nets, and the line
/// items making up the fee.
pub fn quote_transfer(policy: &FeePolicy, amount: Decimal) -> Result<TransferFeeCalculation> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidArgument(format!(
            "transfer amount cannot be negative, got {}",
            amount
        )));
    }

    let transfer_fee = calculate_fee(policy, amount);
    let net_amount = amount.checked_sub(transfer_fee).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "net amount of {} less fee {} is out of range",
            amount, transfer_fee
        ))
    })?;
    if net_amount < Decimal::ZERO {
        warn!(
            policy_id = %policy.id,
            %amount,
            %transfer_fee,
            "Transfer fee exceeds the transfer amount"
        );
    }

    Ok(TransferFeeCalculation {
        policy_id: policy.id,
        currency: policy.currency.clone(),
        amount,
        transfer_fee,
        net_amount,
        fee_breakdown: vec![FeeBreakdown {
            name: policy.fee_name.clone(),
            fee_type: policy.fee_type,
            amount: transfer_fee,
        }],
    })
}
