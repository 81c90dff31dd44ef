//! # Implied Probabilities
//!
//! Turns pool state into a probability vector.
//!
//! ```text
//! constant product, binary:  P(yes) = no / (yes + no)
//! constant product, N-way:   P(i)   = (1 / r_i) / Σ_j (1 / r_j)
//! pari-mutuel:               P(i)   = stake_i / Σ_j stake_j
//! reserve-value:             P(i)   = (v_i / r_i) / Σ_j (v_j / r_j)
//! ```
//!
//! A large reserve means the outcome's shares are plentiful and cheap, so
//! the probability of an outcome is proportional to the inverse of its own
//! reserve. For two outcomes the N-way formula reduces to the binary one;
//! the binary case is computed directly so it is exact.
//!
//! Entries are floored, so a vector sums to `WAD` within `N - 1` raw units
//! (and to 10000 bps within `N - 1` bps).

use anchor_lang::prelude::*;
use spl_math::uint::U256;

use crate::amm::fixed_point::{mul_div, mul_div_wide, narrow, wide, BPS, WAD};
use crate::errors::MarketError;

/// Probability vector in wad, one entry per outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Probabilities(Vec<u128>);

impl Probabilities {
    /// Uniform vector, used when a pool carries no information yet
    pub fn uniform(outcomes: usize) -> Self {
        let share = WAD / outcomes.max(1) as u128;
        Self(vec![share; outcomes])
    }

    /// Certainty on `winner`, used once a market is resolved
    pub fn settled(outcomes: usize, winner: usize) -> Self {
        Self((0..outcomes).map(|i| if i == winner { WAD } else { 0 }).collect())
    }

    /// Constant-product odds from pool reserves
    pub fn from_reserves(reserves: &[u128]) -> Result<Self> {
        require!(reserves.len() >= 2, MarketError::InvalidOutcomeCount);
        require!(reserves.iter().all(|r| *r > 0), MarketError::DivisionByZero);

        if let [yes, no] = reserves {
            let total = yes.checked_add(*no).ok_or(MarketError::ArithmeticOverflow)?;
            return Ok(Self(vec![mul_div(*no, WAD, total)?, mul_div(*yes, WAD, total)?]));
        }

        // 1e54 / r keeps ~34 significant digits for any realistic reserve
        let numerator = wide(WAD) * wide(WAD) * wide(WAD);
        let weights: Vec<U256> = reserves
            .iter()
            .map(|reserve| numerator / wide(*reserve))
            .collect();
        let total = weights.iter().try_fold(U256::zero(), |acc, weight| {
            acc.checked_add(*weight)
                .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
        })?;

        let probabilities = weights
            .into_iter()
            .map(|weight| narrow(mul_div_wide(weight, wide(WAD), total)?))
            .collect::<Result<Vec<u128>>>()?;
        Ok(Self(probabilities))
    }

    /// Reserve-value odds, proportional to each outcome's share price
    pub fn from_prices(values: &[u128], reserves: &[u128]) -> Result<Self> {
        require!(values.len() == reserves.len(), MarketError::InvalidOutcomeCount);
        require!(reserves.iter().all(|r| *r > 0), MarketError::DivisionByZero);
        let prices = values
            .iter()
            .zip(reserves)
            .map(|(value, reserve)| mul_div(*value, WAD, *reserve))
            .collect::<Result<Vec<u128>>>()?;
        Self::from_stakes(&prices)
    }

    /// Pari-mutuel odds from stake totals; uniform before anyone bets.
    pub fn from_stakes(stakes: &[u128]) -> Result<Self> {
        require!(stakes.len() >= 2, MarketError::InvalidOutcomeCount);
        let total = stakes.iter().try_fold(0u128, |acc, stake| {
            acc.checked_add(*stake)
                .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
        })?;
        if total == 0 {
            return Ok(Self::uniform(stakes.len()));
        }

        let probabilities = stakes
            .iter()
            .map(|stake| mul_div(*stake, WAD, total))
            .collect::<Result<Vec<u128>>>()?;
        Ok(Self(probabilities))
    }

    /// Probabilities as wad fractions
    pub fn wad(&self) -> &[u128] {
        &self.0
    }

    /// Probabilities in basis points (0..=10000)
    pub fn bps(&self) -> Vec<u16> {
        // p <= WAD so the quotient is at most 10000
        self.0.iter().map(|p| (p * BPS / WAD) as u16).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all entries in wad
    pub fn total(&self) -> u128 {
        self.0.iter().sum()
    }
}
