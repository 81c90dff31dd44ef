//! # Constant-Product Curve
//!
//! ## The Core Invariant
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │              k = r_0 · r_1 · … · r_{N-1}                    │
//! │                                                              │
//! │   Where:                                                     │
//! │   • r_i = Pool-held shares of outcome i (wad)               │
//! │   • k   = Fixed at pool creation, never stored              │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! For a binary market this is the familiar `yes · no = k`. For many
//! outcomes the product itself does not fit any machine word (16 reserves
//! of 1e22 multiply to 1e352), so the curve never materializes `k`. A bet
//! only needs the ratio by which the other reserves grew.
//!
//! ## Betting Formula
//!
//! When a bettor stakes `L` collateral on outcome `i`:
//!
//! ```text
//! 1. r_j' = r_j + L                        for every j ≠ i
//! 2. r_i' = ⌈r_i · Π_{j≠i} (r_j / r_j')⌉   (product unchanged)
//! 3. shares_out = L + (r_i - r_i')         (minted set + freed reserve)
//! ```
//!
//! Step 2 is evaluated one factor at a time, each rounded up. Every factor
//! is below one, so the running value never exceeds `r_i` and the result
//! sits at most one raw unit per other outcome above the exact solution.
//!
//! Depositing `L` collateral mints `L` shares of every outcome. The shares
//! of the other outcomes go into the pool, the bettor keeps the `L` shares
//! of their outcome and additionally takes the reserve the invariant no
//! longer needs. The solved reserve is rounded up, so the bettor's share
//! count is rounded down.
//!
//! ## Worked Example
//!
//! ```text
//! yes = no = 500, k = 250000
//! bet 100 on YES:
//!   no'  = 600
//!   yes' = ⌈500 · 500 / 600⌉ = 416.666666666666666667
//!   out  = 100 + 500 - 416.666666666666666667 = 183.333333333333333333
//! ```

use anchor_lang::prelude::*;
use spl_math::uint::U256;

use crate::amm::fixed_point::{mul_div_ceil_wide, mul_div_wide, narrow, wide};
use crate::errors::MarketError;

/// Result of pricing a bet against the curve, nothing applied yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BetQuote {
    /// Outcome the bet backs
    pub outcome: usize,
    /// Stake in wad
    pub amount: u128,
    /// Shares credited to the bettor
    pub shares_out: u128,
    /// Pool reserves after the bet
    pub reserves: Vec<u128>,
}

/// Constant-product curve over N outcome reserves
pub struct ConstantProductCurve;

impl ConstantProductCurve {
    /// Solve the chosen reserve after the other reserves moved from
    /// `before` to `after`, keeping the product of all reserves.
    ///
    /// Each factor rounds up, so the result never undershoots the exact
    /// solution and the pool keeps the rounding dust.
    pub fn solve_reserve<'a>(
        reserve: u128,
        others: impl IntoIterator<Item = (&'a u128, &'a u128)>,
    ) -> Result<u128> {
        let mut solved = wide(reserve);
        for (before, after) in others {
            solved = mul_div_ceil_wide(solved, wide(*before), wide(*after))?;
        }
        narrow(solved)
    }

    /// Price a bet of `amount` (wad) on `outcome`.
    pub fn quote_bet(reserves: &[u128], outcome: usize, amount: u128) -> Result<BetQuote> {
        require!(outcome < reserves.len(), MarketError::InvalidOutcome);
        require!(amount > 0, MarketError::ZeroAmount);
        require!(reserves.iter().all(|r| *r > 0), MarketError::InsufficientLiquidity);

        let mut next = reserves.to_vec();
        for (index, reserve) in next.iter_mut().enumerate() {
            if index != outcome {
                *reserve = reserve
                    .checked_add(amount)
                    .ok_or(MarketError::ArithmeticOverflow)?;
            }
        }

        let solved = Self::solve_reserve(
            reserves[outcome],
            reserves
                .iter()
                .zip(next.iter())
                .enumerate()
                .filter(|(index, _)| *index != outcome)
                .map(|(_, pair)| pair),
        )?;

        // Other reserves only grew, so the solved reserve can only shrink
        let freed = reserves[outcome]
            .checked_sub(solved)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let shares_out = amount
            .checked_add(freed)
            .ok_or(MarketError::ArithmeticOverflow)?;
        next[outcome] = solved;

        Ok(BetQuote {
            outcome,
            amount,
            shares_out,
            reserves: next,
        })
    }

    /// Collateral (wad) needed to receive at least `shares_out` shares of
    /// `outcome`, found by bisection over the monotone `quote_bet`.
    ///
    /// This is the "buy exact shares" form of the trade: the result is the
    /// smallest wad stake whose quote meets the target.
    pub fn stake_for_shares(reserves: &[u128], outcome: usize, shares_out: u128) -> Result<u128> {
        require!(outcome < reserves.len(), MarketError::InvalidOutcome);
        require!(shares_out > 0, MarketError::ZeroAmount);

        // Every unit staked yields at least one share, so the target is an upper bound
        let mut low = 1u128;
        let mut high = shares_out;
        while low < high {
            let mid = low + (high - low) / 2;
            if Self::quote_bet(reserves, outcome, mid)?.shares_out >= shares_out {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        Ok(low)
    }

    /// Check a bet on `outcome` that moved the pool from `before` to
    /// `after` against the product invariant.
    ///
    /// The exact solution lies between the rounded-down and rounded-up
    /// evaluations of the solve. The solved reserve must reach the
    /// rounded-up one, so it never undershoots, and may exceed the
    /// rounded-down one by at most two raw units per other outcome.
    pub fn holds_invariant(before: &[u128], after: &[u128], outcome: usize) -> Result<bool> {
        require!(before.len() == after.len(), MarketError::InvalidOutcomeCount);
        require!(outcome < before.len(), MarketError::InvalidOutcome);

        let mut floor = wide(before[outcome]);
        let mut ceil = floor;
        for (index, (old, new)) in before.iter().zip(after.iter()).enumerate() {
            if index == outcome {
                continue;
            }
            if new < old {
                return Ok(false);
            }
            floor = mul_div_wide(floor, wide(*old), wide(*new))?;
            ceil = mul_div_ceil_wide(ceil, wide(*old), wide(*new))?;
        }

        let slack = U256::from(2 * (before.len() as u64 - 1));
        let solved = wide(after[outcome]);
        Ok(solved >= ceil && solved <= floor + slack)
    }
}

// ============================================================================
// TESTS
// ============================================================================
