//! Fixed-point to floating-point conversion at the protocol boundary.
//!
//! Protocol views return integers in a handful of fixed-point encodings:
//! 8-decimal base currency, 18-decimal WAD and 10000 basis points. This is the
//! only place those integers become `f64`; everything downstream works on
//! normalized values. Conversion goes through native U256 limbs, never through
//! strings.

use alloy::primitives::U256;

use crate::error::{Result, RiskError};

/// WAD precision (health factor).
pub const WAD_DECIMALS: u8 = 18;

/// Base currency and oracle price precision.
pub const BASE_CURRENCY_DECIMALS: u8 = 8;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: f64 = 10_000.0;

/// Largest exponent whose power of ten fits in a U256.
pub const MAX_DECIMALS: u8 = 77;

/// 2^64 as f64, used to fold limbs.
const LIMB_BASE: f64 = 18_446_744_073_709_551_616.0;

/// Power of 10 as U256. Caller guarantees `exp <= MAX_DECIMALS`.
#[inline]
fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Convert a U256 to f64, rounding to the nearest representable value.
#[inline]
pub fn u256_to_f64(value: U256) -> f64 {
    if value <= U256::from(u128::MAX) {
        let v: u128 = value.to();
        v as f64
    } else {
        value
            .as_limbs()
            .iter()
            .rev()
            .fold(0.0, |acc, limb| acc * LIMB_BASE + *limb as f64)
    }
}

/// Validate a signed decimal exponent.
pub fn decimals_from_i64(decimals: i64) -> Result<u8> {
    if !(0..=MAX_DECIMALS as i64).contains(&decimals) {
        return Err(RiskError::InvalidDecimals(decimals.to_string()));
    }
    Ok(decimals as u8)
}

/// Validate a decimal exponent reported by a contract as `uint256`.
pub fn decimals_from_u256(decimals: U256) -> Result<u8> {
    if decimals > U256::from(MAX_DECIMALS) {
        return Err(RiskError::InvalidDecimals(decimals.to_string()));
    }
    Ok(decimals.to::<u8>())
}

/// Scale a validated fixed-point integer down by `10^decimals`.
///
/// Integer and fractional parts are converted separately so large balances
/// keep their low digits.
#[inline]
pub fn scale_down(raw: U256, decimals: u8) -> f64 {
    if decimals == 0 {
        return u256_to_f64(raw);
    }
    let divisor = pow10(decimals);
    let whole = raw / divisor;
    let fraction = raw % divisor;
    u256_to_f64(whole) + u256_to_f64(fraction) / 10_f64.powi(decimals as i32)
}

/// Returns `raw / 10^decimals`.
///
/// Fails with [`RiskError::InvalidDecimals`] for a negative exponent or one too
/// large to be a token precision.
pub fn normalize(raw: U256, decimals: i64) -> Result<f64> {
    let decimals = decimals_from_i64(decimals)?;
    Ok(scale_down(raw, decimals))
}

/// Returns `raw / 10000`.
#[inline]
pub fn from_bps(raw: U256) -> f64 {
    u256_to_f64(raw) / BPS_DENOMINATOR
}

/// 18-decimal WAD to f64.
#[inline]
pub fn from_wad(raw: U256) -> f64 {
    scale_down(raw, WAD_DECIMALS)
}

/// 8-decimal base currency (aggregate values, oracle prices) to f64.
#[inline]
pub fn from_base_currency(raw: U256) -> f64 {
    scale_down(raw, BASE_CURRENCY_DECIMALS)
}
