//! Pool State
//!
//! A market's pool is one of three shapes, chosen by its `MarketKind`:
//!
//! ```text
//! Pool::ConstantProduct   reserves[i], supply[i]
//! Pool::ReserveValue      reserves[i], values[i], supply[i]
//! Pool::PariMutuel        total_stake[i]
//! ```
//!
//! Pools are updated by pricing a bet into a fresh pool value and then
//! swapping it in, so a failed bet never leaves a half-updated pool.

use anchor_lang::prelude::*;

use crate::amm::{BetQuote, ConstantProductCurve, Probabilities, ReserveValueCurve};
use crate::errors::MarketError;

#[derive(Clone, Debug, PartialEq)]
pub enum Pool {
    ConstantProduct(ConstantProductPool),
    ReserveValue(ReserveValuePool),
    PariMutuel(PariMutuelPool),
}

/// A bet priced against a pool
#[derive(Clone, Debug, PartialEq)]
pub struct PoolFill {
    /// Shares (constant product) or stake (pari-mutuel) credited to the bettor, wad
    pub minted: u128,
    /// Pool after the bet
    pub pool: Pool,
}

impl Pool {
    /// Pool-side quantity per outcome: reserves or stake totals
    pub fn reserves(&self) -> &[u128] {
        match self {
            Pool::ConstantProduct(pool) => &pool.reserves,
            Pool::ReserveValue(pool) => &pool.reserves,
            Pool::PariMutuel(pool) => &pool.total_stake,
        }
    }

    pub fn probabilities(&self) -> Result<Probabilities> {
        match self {
            Pool::ConstantProduct(pool) => Probabilities::from_reserves(&pool.reserves),
            Pool::ReserveValue(pool) => Probabilities::from_prices(&pool.values, &pool.reserves),
            Pool::PariMutuel(pool) => Probabilities::from_stakes(&pool.total_stake),
        }
    }

    /// Price a bet of `amount` (wad) on `outcome` without touching `self`.
    pub fn fill_bet(&self, outcome: usize, amount: u128) -> Result<PoolFill> {
        match self {
            Pool::ConstantProduct(pool) => {
                let (quote, next) = pool.fill_bet(outcome, amount)?;
                Ok(PoolFill {
                    minted: quote.shares_out,
                    pool: Pool::ConstantProduct(next),
                })
            }
            Pool::ReserveValue(pool) => {
                let (shares, next) = pool.fill_bet(outcome, amount)?;
                Ok(PoolFill {
                    minted: shares,
                    pool: Pool::ReserveValue(next),
                })
            }
            Pool::PariMutuel(pool) => Ok(PoolFill {
                minted: amount,
                pool: Pool::PariMutuel(pool.fill_bet(outcome, amount)?),
            }),
        }
    }
}

/// Constant-product pool over N outcomes
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantProductPool {
    /// Pool-held shares per outcome (wad)
    pub reserves: Vec<u128>,

    /// Outstanding shares per outcome: pool reserve plus every position
    pub supply: Vec<u128>,
}

impl ConstantProductPool {
    /// Seed every outcome with `liquidity` (wad) shares.
    pub fn seed(outcomes: usize, liquidity: u128) -> Result<Self> {
        require!(liquidity > 0, MarketError::InsufficientLiquidity);
        let reserves = vec![liquidity; outcomes];
        Ok(Self {
            supply: reserves.clone(),
            reserves,
        })
    }

    pub fn quote_bet(&self, outcome: usize, amount: u128) -> Result<BetQuote> {
        ConstantProductCurve::quote_bet(&self.reserves, outcome, amount)
    }

    /// Smallest stake (wad) that mints at least `shares` of `outcome`
    pub fn stake_for_shares(&self, outcome: usize, shares: u128) -> Result<u128> {
        ConstantProductCurve::stake_for_shares(&self.reserves, outcome, shares)
    }

    fn fill_bet(&self, outcome: usize, amount: u128) -> Result<(BetQuote, Self)> {
        let quote = self.quote_bet(outcome, amount)?;
        // A bet mints `amount` of every outcome
        let supply = self
            .supply
            .iter()
            .map(|s| s.checked_add(amount).ok_or_else(|| error!(MarketError::ArithmeticOverflow)))
            .collect::<Result<Vec<u128>>>()?;
        let next = Self {
            reserves: quote.reserves.clone(),
            supply,
        };
        Ok((quote, next))
    }

    /// Remove `shares` of `outcome` from circulation.
    pub fn burn(&mut self, outcome: usize, shares: u128) -> Result<()> {
        burn_supply(&mut self.supply, outcome, shares)
    }
}

/// Pre-minted shares per outcome, each sold against its own collateral value
#[derive(Clone, Debug, PartialEq)]
pub struct ReserveValuePool {
    /// Unsold shares per outcome (wad)
    pub reserves: Vec<u128>,

    /// Collateral backing each outcome's pool (wad)
    pub values: Vec<u128>,

    /// Outstanding shares per outcome: pool reserve plus every position
    pub supply: Vec<u128>,
}

impl ReserveValuePool {
    /// Mint `liquidity` (wad) shares of every outcome, each valued at par.
    pub fn seed(outcomes: usize, liquidity: u128) -> Result<Self> {
        require!(liquidity > 0, MarketError::InsufficientLiquidity);
        Ok(Self {
            reserves: vec![liquidity; outcomes],
            values: vec![liquidity; outcomes],
            supply: vec![liquidity; outcomes],
        })
    }

    /// Collateral (wad) that buys exactly `shares` of `outcome`
    pub fn amount_in(&self, outcome: usize, shares: u128) -> Result<u128> {
        let (value, reserve) = self.side(outcome)?;
        ReserveValueCurve::amount_in(value, reserve, shares)
    }

    fn fill_bet(&self, outcome: usize, amount: u128) -> Result<(u128, Self)> {
        let (value, reserve) = self.side(outcome)?;
        let shares = ReserveValueCurve::shares_out(value, reserve, amount)?;
        require!(shares > 0, MarketError::SlippageExceeded);
        Ok((shares, self.take(outcome, shares, amount)?))
    }

    /// Sell `shares` of `outcome` for `paid` (wad), which must cover their price.
    pub fn fill_shares(&self, outcome: usize, shares: u128, paid: u128) -> Result<Self> {
        let cost = self.amount_in(outcome, shares)?;
        require!(paid >= cost, MarketError::SlippageExceeded);
        self.take(outcome, shares, paid)
    }

    fn take(&self, outcome: usize, shares: u128, paid: u128) -> Result<Self> {
        let mut next = self.clone();
        next.reserves[outcome] = next.reserves[outcome]
            .checked_sub(shares)
            .ok_or(MarketError::InsufficientLiquidity)?;
        next.values[outcome] = next.values[outcome]
            .checked_add(paid)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(next)
    }

    fn side(&self, outcome: usize) -> Result<(u128, u128)> {
        require!(outcome < self.reserves.len(), MarketError::InvalidOutcome);
        Ok((self.values[outcome], self.reserves[outcome]))
    }

    pub fn burn(&mut self, outcome: usize, shares: u128) -> Result<()> {
        burn_supply(&mut self.supply, outcome, shares)
    }
}

fn burn_supply(supply: &mut [u128], outcome: usize, shares: u128) -> Result<()> {
    let supply = supply.get_mut(outcome).ok_or(MarketError::InvalidOutcome)?;
    *supply = supply
        .checked_sub(shares)
        .ok_or(MarketError::ArithmeticOverflow)?;
    Ok(())
}

/// Stake totals per outcome, no price curve
#[derive(Clone, Debug, PartialEq)]
pub struct PariMutuelPool {
    /// Total staked per outcome (wad)
    pub total_stake: Vec<u128>,
}

impl PariMutuelPool {
    pub fn new(outcomes: usize) -> Self {
        Self {
            total_stake: vec![0; outcomes],
        }
    }

    fn fill_bet(&self, outcome: usize, amount: u128) -> Result<Self> {
        require!(outcome < self.total_stake.len(), MarketError::InvalidOutcome);
        require!(amount > 0, MarketError::ZeroAmount);
        let mut total_stake = self.total_stake.clone();
        total_stake[outcome] = total_stake[outcome]
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(Self { total_stake })
    }
}
