//! # Pari-Mutuel Payouts
//!
//! No price curve: stakes simply accumulate per outcome and the losing
//! side funds the winners in proportion to their stake.
//!
//! ```text
//! profit = ⌊losing_total · stake / winning_total⌋
//! payout = stake + profit
//! ```
//!
//! Profit is floored per claimant, so the sum of all payouts never exceeds
//! the pot and any remainder stays with the pool.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::mul_div;
use crate::errors::MarketError;

pub struct PariMutuel;

impl PariMutuel {
    /// Stake total of every outcome other than `winning`
    pub fn losing_total(totals: &[u128], winning: usize) -> Result<u128> {
        require!(winning < totals.len(), MarketError::InvalidOutcome);
        totals
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != winning)
            .try_fold(0u128, |acc, (_, stake)| {
                acc.checked_add(*stake)
                    .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
            })
    }

    /// Share of the losing pool owed to `stake` on the winning side
    pub fn profit(stake: u128, winning_total: u128, losing_total: u128) -> Result<u128> {
        require!(stake <= winning_total, MarketError::ArithmeticOverflow);
        mul_div(losing_total, stake, winning_total)
    }

    /// Stake returned plus profit
    pub fn payout(stake: u128, winning_total: u128, losing_total: u128) -> Result<u128> {
        let profit = Self::profit(stake, winning_total, losing_total)?;
        stake
            .checked_add(profit)
            .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::fixed_point::WAD;
    use crate::errors::assert_market_error;

    #[test]
    fn test_binary_payout() {
        // Alice 2 on YES, Bob 3 on NO, YES wins
        let totals = [2 * WAD, 3 * WAD];
        let losing = PariMutuel::losing_total(&totals, 0).unwrap();
        assert_eq!(losing, 3 * WAD);
        assert_eq!(PariMutuel::payout(2 * WAD, 2 * WAD, losing).unwrap(), 5 * WAD);
    }

    #[test]
    fn test_nway_payout_splits_losers() {
        let totals = [WAD, 2 * WAD, 3 * WAD];
        let losing = PariMutuel::losing_total(&totals, 1).unwrap();
        assert_eq!(losing, 4 * WAD);
        assert_eq!(PariMutuel::payout(2 * WAD, 2 * WAD, losing).unwrap(), 6 * WAD);
    }

    #[test]
    fn test_profit_floors_and_conserves() {
        // three winners of 1 each share a losing pool of 10 raw units
        let profits: u128 = (0..3)
            .map(|_| PariMutuel::profit(1, 3, 10).unwrap())
            .sum();
        assert_eq!(profits, 9);
    }

    #[test]
    fn test_empty_winning_side() {
        assert_market_error(PariMutuel::profit(0, 0, 5), MarketError::DivisionByZero);
        assert_market_error(PariMutuel::losing_total(&[1, 2], 2), MarketError::InvalidOutcome);
    }
}
