//! Tests for fee quoting

use std::str::FromStr;

use fo3_fees::{calculate_fee, quote_transfer, FeePolicy, FeeType, TierRange};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_fixed_fee_quote() {
    let policy = FeePolicy::fixed("Wallet transfer fee", dec("1.00"), "USD");

    let quote = quote_transfer(&policy, dec("100.00")).unwrap();

    assert_eq!(quote.transfer_fee, dec("1.00"));
    assert_eq!(quote.net_amount, dec("99.00"));
    assert_eq!(quote.fee_breakdown.len(), 1);
    assert_eq!(quote.fee_breakdown[0].amount, dec("1.00"));
}

#[test]
fn test_tiered_boundaries() {
    let policy = FeePolicy::tiered(
        "Tiered transfer fee",
        vec![
            TierRange::new(dec("0"), Some(dec("100")), dec("1.0")),
            TierRange::new(dec("100"), None, dec("2.0")),
        ],
        "USD",
    );
    policy.validate().unwrap();

    assert_eq!(calculate_fee(&policy, dec("50")), dec("1.0"));
    assert_eq!(calculate_fee(&policy, dec("150")), dec("2.0"));
    // Both tiers contain 100; the first one declared wins
    assert_eq!(calculate_fee(&policy, dec("100")), dec("1.0"));
}

#[test]
fn test_empty_tiers_quote_zero_fee() {
    let policy = FeePolicy::tiered("No tiers", vec![], "USD");

    let quote = quote_transfer(&policy, dec("42.50")).unwrap();

    assert_eq!(quote.transfer_fee, Decimal::ZERO);
    assert_eq!(quote.net_amount, dec("42.50"));
    assert_eq!(quote.fee_breakdown[0].fee_type, FeeType::Tiered);
}

#[test]
fn test_clamped_percentage_quote() {
    let policy = FeePolicy::percentage("Card-to-wallet", dec("0.029"), "USD")
        .with_minimum_fee(dec("2.0"))
        .with_maximum_fee(dec("10.0"));

    let small = quote_transfer(&policy, dec("20")).unwrap();
    assert_eq!(small.transfer_fee, dec("2.0"));
    assert_eq!(small.net_amount, dec("18.0"));

    let mid = quote_transfer(&policy, dec("200")).unwrap();
    assert_eq!(mid.transfer_fee, dec("5.8"));

    let large = quote_transfer(&policy, dec("1000")).unwrap();
    assert_eq!(large.transfer_fee, dec("10.0"));
    assert_eq!(large.net_amount, dec("990.0"));
}

#[test]
fn test_quote_ignores_effectiveness() {
    let policy = FeePolicy::fixed("Retired", dec("3"), "USD").deactivated();

    let quote = quote_transfer(&policy, dec("10")).unwrap();

    assert_eq!(quote.transfer_fee, dec("3"));
}

#[test]
fn test_zero_amount_quote() {
    let policy = FeePolicy::fixed("Flat", dec("0.50"), "USD");

    let quote = quote_transfer(&policy, Decimal::ZERO).unwrap();

    assert_eq!(quote.transfer_fee, dec("0.50"));
    assert_eq!(quote.net_amount, dec("-0.50"));
}
