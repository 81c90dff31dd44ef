//! # Reserve-Value Curve
//!
//! Each outcome is its own pool: the creator's liquidity pre-mints shares,
//! and every share sold is priced against the collateral value the pool
//! has already collected for that outcome.
//!
//! ```text
//! value_i · r_i = const                      (per outcome)
//!
//! buy `out` shares of i:
//!   amount_in = ⌈value_i · out / (r_i - out)⌉
//!   r_i'      = r_i - out
//!   value_i'  = value_i + amount_in
//! ```
//!
//! Outcomes do not interact: buying YES leaves the NO pool untouched. The
//! marginal price of a share is `value_i / r_i`, starting at 1.
//!
//! ## Worked Example
//!
//! ```text
//! value = reserve = 500
//! buy 100: amount_in = 500 · 100 / 400 = 125        value 625,    reserve 400
//! buy 100: amount_in = 625 · 100 / 300 = 208.33..   value 833.33, reserve 300
//! ```

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{mul_div, mul_div_ceil, WAD};
use crate::errors::MarketError;

pub struct ReserveValueCurve;

impl ReserveValueCurve {
    /// Collateral (wad) needed to take exactly `shares_out` from a pool
    /// holding `reserve` shares backed by `value`. Rounded up.
    pub fn amount_in(value: u128, reserve: u128, shares_out: u128) -> Result<u128> {
        require!(shares_out > 0, MarketError::ZeroAmount);
        require!(shares_out < reserve, MarketError::InsufficientLiquidity);
        mul_div_ceil(value, shares_out, reserve - shares_out)
    }

    /// Shares (wad) that `amount_in` collateral buys. Rounded down.
    pub fn shares_out(value: u128, reserve: u128, amount_in: u128) -> Result<u128> {
        require!(amount_in > 0, MarketError::ZeroAmount);
        require!(reserve > 0, MarketError::InsufficientLiquidity);
        let next_value = value
            .checked_add(amount_in)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let next_reserve = mul_div_ceil(value, reserve, next_value)?;
        Ok(reserve - next_reserve)
    }

    /// Marginal price of one share in wad
    pub fn price(value: u128, reserve: u128) -> Result<u128> {
        mul_div(value, WAD, reserve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_market_error;

    #[test]
    fn test_exact_share_purchases() {
        let cost = ReserveValueCurve::amount_in(500 * WAD, 500 * WAD, 100 * WAD).unwrap();
        assert_eq!(cost, 125 * WAD);

        let cost = ReserveValueCurve::amount_in(625 * WAD, 400 * WAD, 100 * WAD).unwrap();
        assert_eq!(cost, 208_333_333_333_333_333_334);
    }

    #[test]
    fn test_collateral_in_inverts_amount_in() {
        let shares = ReserveValueCurve::shares_out(500 * WAD, 500 * WAD, 125 * WAD).unwrap();
        assert_eq!(shares, 100 * WAD);
    }

    #[test]
    fn test_pool_cannot_be_emptied() {
        assert_market_error(
            ReserveValueCurve::amount_in(500 * WAD, 500 * WAD, 500 * WAD),
            MarketError::InsufficientLiquidity,
        );
        assert_market_error(
            ReserveValueCurve::amount_in(500 * WAD, 500 * WAD, 0),
            MarketError::ZeroAmount,
        );
    }

    #[test]
    fn test_price_starts_at_par() {
        assert_eq!(ReserveValueCurve::price(500 * WAD, 500 * WAD).unwrap(), WAD);
        assert_eq!(ReserveValueCurve::price(625 * WAD, 400 * WAD).unwrap(), 1_562_500_000_000_000_000);
    }
}
