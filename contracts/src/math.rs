//! Fixed-point conversions between collateral amounts and USD values.
//!
//! Prices carry 8 fractional digits, USD amounts carry 18. Every product is
//! formed in U512 before the single truncating division, so no intermediate
//! can overflow and only the final quotient has to fit in U256.

use odra::casper_types::{U256, U512};
use crate::errors::EngineError;

/// Fractional digits of oracle prices
pub const PRICE_DECIMALS: u8 = 8;
/// Lifts an 8-decimal price to 18 decimals (1e10)
pub const ADDITIONAL_FEED_PRECISION: u64 = 10_000_000_000;
/// USD amount precision (1e18)
pub const PRECISION: u64 = 1_000_000_000_000_000_000;
/// Health factor scale: collateral * 1e17 / debt, so 2e17 means 200%
pub const HEALTH_FACTOR_SCALE: u64 = 100_000_000_000_000_000;
/// Minimum health factor (200% collateralization)
pub const MIN_HEALTH_FACTOR: u64 = 200_000_000_000_000_000;
/// Largest accepted collateral decimals
pub const MAX_COLLATERAL_DECIMALS: u8 = 38;

pub type MathResult<T> = Result<T, EngineError>;

/// `a * b / denominator`, truncating, with a 512-bit intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let product = u256_to_u512(a) * u256_to_u512(b);
    u512_to_u256(product / u256_to_u512(denominator))
}

/// USD value (18 decimals) of `amount` units of a token with `decimals`.
///
/// `price * amount * 1e10 / 10^decimals`
pub fn usd_value(price: U256, amount: U256, decimals: u8) -> MathResult<U256> {
    if price.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let numerator = u256_to_u512(price)
        .checked_mul(u256_to_u512(amount))
        .and_then(|v| v.checked_mul(U512::from(ADDITIONAL_FEED_PRECISION)))
        .ok_or(EngineError::ArithmeticOverflow)?;
    u512_to_u256(numerator / pow10(decimals)?)
}

/// Token amount worth `usd_amount` (18 decimals) at `price`.
///
/// `usd_amount * 10^decimals / (price * 1e10)`
pub fn token_amount_from_usd(usd_amount: U256, decimals: u8, price: U256) -> MathResult<U256> {
    if price.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let numerator = u256_to_u512(usd_amount)
        .checked_mul(pow10(decimals)?)
        .ok_or(EngineError::ArithmeticOverflow)?;
    let denominator = u256_to_u512(price) * U512::from(ADDITIONAL_FEED_PRECISION);
    u512_to_u256(numerator / denominator)
}

/// Health factor of a position; `U256::MAX` when there is no debt.
pub fn health_factor(collateral_value_usd: U256, total_debt: U256) -> MathResult<U256> {
    if total_debt.is_zero() {
        return Ok(U256::MAX);
    }
    match mul_div(collateral_value_usd, U256::from(HEALTH_FACTOR_SCALE), total_debt) {
        // Anything too large for U256 is as healthy as no debt at all.
        Err(EngineError::ArithmeticOverflow) => Ok(U256::MAX),
        other => other,
    }
}

pub fn is_healthy(health_factor: U256) -> bool {
    health_factor >= U256::from(MIN_HEALTH_FACTOR)
}

pub fn checked_add(a: U256, b: U256) -> MathResult<U256> {
    a.checked_add(b).ok_or(EngineError::ArithmeticOverflow)
}

/// `a - b`, failing with `shortfall` when `b > a`.
pub fn checked_sub(a: U256, b: U256, shortfall: EngineError) -> MathResult<U256> {
    a.checked_sub(b).ok_or(shortfall)
}

fn pow10(decimals: u8) -> MathResult<U512> {
    if decimals > MAX_COLLATERAL_DECIMALS {
        return Err(EngineError::InvalidDecimals);
    }
    Ok(U512::exp10(decimals as usize))
}

/// Convert U256 to U512
pub fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

/// Convert U512 to U256, rejecting values above `U256::MAX`
pub fn u512_to_u256(value: U512) -> MathResult<U256> {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    if bytes[32..].iter().any(|b| *b != 0) {
        return Err(EngineError::ArithmeticOverflow);
    }
    Ok(U256::from_little_endian(&bytes[..32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(n: u64) -> U256 {
        U256::from(n) * U256::from(PRECISION)
    }

    #[test]
    fn test_usd_value_eth_at_2000() {
        // 15 ETH * $2000 = $30,000
        let price = U256::from(2000u64) * U256::from(100_000_000u64);
        assert_eq!(usd_value(price, e18(15), 18), Ok(e18(30_000)));
    }

    #[test]
    fn test_usd_value_low_decimal_token() {
        // 2.5 BTC-like units with 8 decimals at $30,000
        let price = U256::from(30_000u64) * U256::from(100_000_000u64);
        let amount = U256::from(250_000_000u64);
        assert_eq!(usd_value(price, amount, 8), Ok(e18(75_000)));
    }

    #[test]
    fn test_token_amount_from_usd() {
        // $100 at $2000/ETH = 0.05 ETH
        let price = U256::from(2000u64) * U256::from(100_000_000u64);
        let expected = U256::from(50_000_000_000_000_000u64);
        assert_eq!(token_amount_from_usd(e18(100), 18, price), Ok(expected));
    }

    #[test]
    fn test_conversions_truncate() {
        // 1 wei at $1.5 is worth 1.5e8 * 1e10 * 1 / 1e18 = 1.5 -> 1
        let price = U256::from(150_000_000u64);
        assert_eq!(usd_value(price, U256::one(), 18), Ok(U256::one()));
        // 1 wei at $0.90 is worth 0.9 -> 0
        let price = U256::from(90_000_000u64);
        assert_eq!(usd_value(price, U256::one(), 18), Ok(U256::zero()));
        // $1 at $3 -> 0.333.. tokens, truncated
        let price = U256::from(300_000_000u64);
        assert_eq!(
            token_amount_from_usd(e18(1), 18, price),
            Ok(U256::from(333_333_333_333_333_333u64))
        );
    }

    #[test]
    fn test_round_trip_never_gains() {
        let prices = [1u64, 7, 150_000_000, 199_999_999_999, 2_000_00000000];
        let amounts = [1u64, 3, 999, 1_000_000_007, 123_456_789_123_456_789];
        for decimals in [0u8, 6, 8, 18, 24] {
            for price in prices {
                for amount in amounts {
                    let price = U256::from(price);
                    let amount = U256::from(amount);
                    let usd = usd_value(price, amount, decimals).unwrap();
                    let back = token_amount_from_usd(usd, decimals, price).unwrap();
                    assert!(back <= amount, "gained value at p={price} a={amount} d={decimals}");
                }
            }
        }
    }

    #[test]
    fn test_zero_price_is_division_by_zero() {
        assert_eq!(usd_value(U256::zero(), e18(1), 18), Err(EngineError::DivisionByZero));
        assert_eq!(token_amount_from_usd(e18(1), 18, U256::zero()), Err(EngineError::DivisionByZero));
        assert_eq!(mul_div(U256::one(), U256::one(), U256::zero()), Err(EngineError::DivisionByZero));
    }

    #[test]
    fn test_wide_intermediate_does_not_overflow() {
        // price * amount exceeds U256 but the quotient fits
        let big = U256::MAX / U256::from(2u64);
        assert_eq!(mul_div(big, U256::from(4u64), U256::from(4u64)), Ok(big));
    }

    #[test]
    fn test_oversized_result_is_overflow() {
        assert_eq!(
            usd_value(U256::MAX, U256::MAX, 0),
            Err(EngineError::ArithmeticOverflow)
        );
        assert_eq!(
            mul_div(U256::MAX, U256::from(2u64), U256::one()),
            Err(EngineError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_decimals_above_cap_rejected() {
        assert_eq!(usd_value(U256::one(), U256::one(), 39), Err(EngineError::InvalidDecimals));
    }

    #[test]
    fn test_health_factor_boundaries() {
        let collateral = e18(20_000);
        assert_eq!(health_factor(collateral, e18(10_000)), Ok(U256::from(MIN_HEALTH_FACTOR)));
        assert!(is_healthy(health_factor(collateral, e18(10_000)).unwrap()));
        assert!(is_healthy(health_factor(collateral, e18(9_999)).unwrap()));
        assert!(!is_healthy(health_factor(collateral, e18(10_001)).unwrap()));
    }

    #[test]
    fn test_health_factor_without_debt_is_max() {
        assert_eq!(health_factor(U256::zero(), U256::zero()), Ok(U256::MAX));
        assert_eq!(health_factor(e18(5), U256::zero()), Ok(U256::MAX));
    }

    #[test]
    fn test_health_factor_saturates() {
        assert_eq!(health_factor(U256::MAX, U256::one()), Ok(U256::MAX));
    }

    #[test]
    fn test_checked_sub_reports_shortfall() {
        assert_eq!(
            checked_sub(U256::one(), U256::from(2u64), EngineError::InsufficientDebt),
            Err(EngineError::InsufficientDebt)
        );
        assert_eq!(checked_add(U256::MAX, U256::one()), Err(EngineError::ArithmeticOverflow));
    }

    #[test]
    fn test_u512_round_trip() {
        let value = U256::MAX - U256::from(12345u64);
        assert_eq!(u512_to_u256(u256_to_u512(value)), Ok(value));
    }
}
