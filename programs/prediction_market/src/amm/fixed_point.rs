//! # Fixed-Point Arithmetic
//!
//! All share and reserve quantities inside the engine are `u128` integers
//! scaled by 10^18 ("wad"). Collateral amounts cross the boundary as `u64`
//! in the token's own decimals (6 for USDC) and are converted explicitly.
//!
//! ```text
//!   collateral (u64, 6 dp) ──to_wad──▶ engine (u128, 18 dp)
//!   engine (u128, 18 dp)   ──from_wad─▶ collateral (u64, 6 dp, floored)
//! ```
//!
//! Payouts use `from_wad`; prices a buyer must pay use `from_wad_ceil`.
//!
//! Products are taken in a 256-bit intermediate so `a * b` never wraps.
//! Rounding is always floor unless the caller explicitly asks for the
//! ceiling, which the curve does when solving a reserve so the pool keeps
//! the dust.

use anchor_lang::prelude::*;
use spl_math::uint::U256;

use crate::errors::MarketError;

/// Decimals of the internal fixed-point representation
pub const WAD_DECIMALS: u8 = 18;

/// 1.0 in wad
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// 1.0 in basis points
pub const BPS: u128 = 10_000;

/// Lift a `u128` into the wide type.
pub fn wide(value: u128) -> U256 {
    U256::from(value)
}

/// Narrow a wide value back to `u128`, failing if it does not fit.
pub fn narrow(value: U256) -> Result<u128> {
    require!(value <= U256::from(u128::MAX), MarketError::ArithmeticOverflow);
    Ok(value.as_u128())
}

/// floor(a * b / denom) over 256-bit operands
pub fn mul_div_wide(a: U256, b: U256, denom: U256) -> Result<U256> {
    require!(!denom.is_zero(), MarketError::DivisionByZero);
    let product = a.checked_mul(b).ok_or(MarketError::ArithmeticOverflow)?;
    Ok(product / denom)
}

/// ceil(a * b / denom) over 256-bit operands
pub fn mul_div_ceil_wide(a: U256, b: U256, denom: U256) -> Result<U256> {
    require!(!denom.is_zero(), MarketError::DivisionByZero);
    let product = a.checked_mul(b).ok_or(MarketError::ArithmeticOverflow)?;
    let quotient = product / denom;
    if (product % denom).is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(U256::one())
            .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
    }
}

/// floor(a * b / denom)
///
/// # Example
/// ```
/// use outcome_amm::amm::fixed_point::{mul_div, WAD};
/// // 0.5 * 3.0 = 1.5
/// let half = WAD / 2;
/// assert_eq!(mul_div(half, 3 * WAD, WAD).unwrap(), 3 * WAD / 2);
/// ```
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128> {
    narrow(mul_div_wide(wide(a), wide(b), wide(denom))?)
}

/// ceil(a * b / denom)
pub fn mul_div_ceil(a: u128, b: u128, denom: u128) -> Result<u128> {
    narrow(mul_div_ceil_wide(wide(a), wide(b), wide(denom))?)
}

fn pow10(exponent: u8) -> Result<u128> {
    10u128
        .checked_pow(exponent as u32)
        .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
}

fn rescale(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128> {
    if to_decimals >= from_decimals {
        amount
            .checked_mul(pow10(to_decimals - from_decimals)?)
            .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
    } else {
        Ok(amount / pow10(from_decimals - to_decimals)?)
    }
}

/// Convert `amount` from `from_decimals` to the larger `to_decimals` scale.
///
/// If the target scale is actually smaller the value is floored, so the
/// call is safe in either direction.
pub fn scale_up(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128> {
    rescale(amount, from_decimals, to_decimals)
}

/// Convert `amount` from `from_decimals` down to `to_decimals`, flooring.
pub fn scale_down(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128> {
    rescale(amount, from_decimals, to_decimals)
}

/// Collateral units to wad
pub fn to_wad(amount: u64, decimals: u8) -> Result<u128> {
    scale_up(amount as u128, decimals, WAD_DECIMALS)
}

/// Wad to collateral units, floored toward the pool
pub fn from_wad(amount: u128, decimals: u8) -> Result<u64> {
    let scaled = scale_down(amount, WAD_DECIMALS, decimals)?;
    u64::try_from(scaled).map_err(|_| error!(MarketError::ArithmeticOverflow))
}

/// Wad to collateral units, rounded up so a buyer never underpays
pub fn from_wad_ceil(amount: u128, decimals: u8) -> Result<u64> {
    require!(decimals <= WAD_DECIMALS, MarketError::InvalidConfig);
    let unit = pow10(WAD_DECIMALS - decimals)?;
    let scaled = amount / unit + u128::from(amount % unit != 0);
    u64::try_from(scaled).map_err(|_| error!(MarketError::ArithmeticOverflow))
}
