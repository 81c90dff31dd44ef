//! Betting
//!
//! Routes a stake into the market's pool: priced along the market's curve,
//! or simply added to the outcome's stake total for pari-mutuel markets.
//!
//! Curve markets also sell an exact number of shares. The price is rounded
//! up to whole collateral units, so the buyer may receive slightly more
//! shares than asked for on a constant-product pool, never fewer.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{from_wad_ceil, to_wad};
use crate::errors::MarketError;
use crate::state::{CollateralVault, Market, Pool};

/// Event emitted when a bet is placed
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct BetPlaced {
    pub market: Pubkey,
    pub bettor: Pubkey,
    pub outcome: u8,
    /// Stake in collateral units
    pub amount: u64,
    /// Shares (curve markets) or stake weight (pari-mutuel) credited, wad
    pub shares_minted: u128,
}

/// Event emitted when a buyer takes an exact number of shares
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct SharesBought {
    pub market: Pubkey,
    pub buyer: Pubkey,
    pub outcome: u8,
    /// Shares credited, wad
    pub shares: u128,
    /// Price paid in collateral units
    pub amount: u64,
}

/// A trade priced against the current pool, not yet committed
struct Fill {
    index: usize,
    amount: u64,
    credited: u128,
    pool: Pool,
}

impl Market {
    /// Shares (or stake) a bet would mint right now, without placing it
    pub fn quote_bet(&self, outcome: u8, amount: u64) -> Result<u128> {
        Ok(self.price_bet(outcome, amount)?.credited)
    }

    /// Collateral that buys `shares` of `outcome` right now
    pub fn quote_shares(&self, outcome: u8, shares: u128) -> Result<u64> {
        Ok(self.price_shares(outcome, shares)?.amount)
    }

    /// Place a bet of `amount` collateral on `outcome`.
    ///
    /// Fails with `SlippageExceeded` if fewer than `min_shares_out` would be
    /// minted. The stake is pulled through `vault` before anything is
    /// committed, so a refused transfer leaves the market unchanged.
    pub fn place_bet(
        &mut self,
        vault: &mut dyn CollateralVault,
        bettor: Pubkey,
        outcome: u8,
        amount: u64,
        min_shares_out: u128,
    ) -> Result<u128> {
        let fill = self.price_bet(outcome, amount)?;
        require!(fill.credited >= min_shares_out, MarketError::SlippageExceeded);
        let shares_minted = fill.credited;
        self.commit(vault, bettor, fill)?;

        let event = BetPlaced {
            market: self.id,
            bettor,
            outcome,
            amount,
            shares_minted,
        };
        emit!(event.clone());
        self.record(event);

        Ok(shares_minted)
    }

    /// Buy `shares` of `outcome`, paying at most `max_amount_in` collateral.
    ///
    /// Returns the collateral paid. Pari-mutuel markets have no share price
    /// and reject this with `UnsupportedMarketKind`.
    pub fn buy_shares(
        &mut self,
        vault: &mut dyn CollateralVault,
        buyer: Pubkey,
        outcome: u8,
        shares: u128,
        max_amount_in: u64,
    ) -> Result<u64> {
        let fill = self.price_shares(outcome, shares)?;
        require!(fill.amount <= max_amount_in, MarketError::SlippageExceeded);
        let (amount, credited) = (fill.amount, fill.credited);
        self.commit(vault, buyer, fill)?;

        let event = SharesBought {
            market: self.id,
            buyer,
            outcome,
            shares: credited,
            amount,
        };
        emit!(event.clone());
        self.record(event);

        Ok(amount)
    }

    fn open_outcome(&self, outcome: u8) -> Result<usize> {
        require!(!self.is_resolved(), MarketError::MarketResolved);
        self.outcome_index(outcome)
    }

    fn price_bet(&self, outcome: u8, amount: u64) -> Result<Fill> {
        let index = self.open_outcome(outcome)?;
        require!(amount > 0, MarketError::ZeroAmount);

        let stake = to_wad(amount, self.collateral_decimals)?;
        let fill = self.pool.fill_bet(index, stake)?;
        Ok(Fill {
            index,
            amount,
            credited: fill.minted,
            pool: fill.pool,
        })
    }

    fn price_shares(&self, outcome: u8, shares: u128) -> Result<Fill> {
        let index = self.open_outcome(outcome)?;
        require!(shares > 0, MarketError::ZeroAmount);

        match &self.pool {
            Pool::ConstantProduct(pool) => {
                let stake = pool.stake_for_shares(index, shares)?;
                let amount = from_wad_ceil(stake, self.collateral_decimals)?;
                self.price_bet(outcome, amount)
            }
            Pool::ReserveValue(pool) => {
                let cost = pool.amount_in(index, shares)?;
                let amount = from_wad_ceil(cost, self.collateral_decimals)?;
                let paid = to_wad(amount, self.collateral_decimals)?;
                Ok(Fill {
                    index,
                    amount,
                    credited: shares,
                    pool: Pool::ReserveValue(pool.fill_shares(index, shares, paid)?),
                })
            }
            Pool::PariMutuel(_) => err!(MarketError::UnsupportedMarketKind),
        }
    }

    /// Pull the collateral, then credit the position and swap in the new pool.
    fn commit(&mut self, vault: &mut dyn CollateralVault, participant: Pubkey, fill: Fill) -> Result<()> {
        let mut position = self.position(&participant);
        position[fill.index] = position[fill.index]
            .checked_add(fill.credited)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let collateral_held = self
            .collateral_held
            .checked_add(fill.amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        vault.deposit(&self.collateral_mint, &participant, fill.amount)?;

        self.pool = fill.pool;
        self.positions.insert(participant, position);
        self.collateral_held = collateral_held;
        Ok(())
    }
}
