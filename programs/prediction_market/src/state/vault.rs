//! Collateral Custody
//!
//! Moving tokens is not the engine's job. The engine only tells a
//! `CollateralVault` to pull a stake in or pay a claim out, and commits its
//! own state once the vault has agreed.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::MarketError;

/// Token-transfer collaborator
pub trait CollateralVault {
    /// Pull `amount` of `mint` from `from` into custody.
    fn deposit(&mut self, mint: &Pubkey, from: &Pubkey, amount: u64) -> Result<()>;

    /// Pay `amount` of `mint` out of custody to `to`.
    fn withdraw(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
}

/// Vault that accepts every transfer without bookkeeping, used when
/// re-executing an event log whose transfers already happened.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplayVault;

impl CollateralVault for ReplayVault {
    fn deposit(&mut self, _mint: &Pubkey, _from: &Pubkey, _amount: u64) -> Result<()> {
        Ok(())
    }

    fn withdraw(&mut self, _mint: &Pubkey, _to: &Pubkey, _amount: u64) -> Result<()> {
        Ok(())
    }
}

/// In-memory token ledger with ERC20-style allowances
///
/// Participants must `approve` the engine before a deposit, mirroring an
/// approve-then-transferFrom flow.
#[derive(Clone, Debug, Default)]
pub struct InMemoryVault {
    balances: BTreeMap<(Pubkey, Pubkey), u64>,
    allowances: BTreeMap<(Pubkey, Pubkey), u64>,
    custody: BTreeMap<Pubkey, u64>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` with freshly minted tokens.
    pub fn mint(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
        let balance = self.balances.entry((*mint, *owner)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Allow the engine to pull up to `amount` from `owner`.
    pub fn approve(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) {
        self.allowances.insert((*mint, *owner), amount);
    }

    pub fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.balances.get(&(*mint, *owner)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.allowances.get(&(*mint, *owner)).copied().unwrap_or(0)
    }

    /// Total collateral of `mint` held on the engine's behalf
    pub fn custody(&self, mint: &Pubkey) -> u64 {
        self.custody.get(mint).copied().unwrap_or(0)
    }
}

impl CollateralVault for InMemoryVault {
    fn deposit(&mut self, mint: &Pubkey, from: &Pubkey, amount: u64) -> Result<()> {
        let allowance = self.allowance(mint, from);
        require!(allowance >= amount, MarketError::InsufficientAllowance);
        let balance = self.balance_of(mint, from);
        require!(balance >= amount, MarketError::InsufficientBalance);
        let custody = self
            .custody(mint)
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.allowances.insert((*mint, *from), allowance - amount);
        self.balances.insert((*mint, *from), balance - amount);
        self.custody.insert(*mint, custody);
        Ok(())
    }

    fn withdraw(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let custody = self.custody(mint);
        require!(custody >= amount, MarketError::InsufficientBalance);
        let balance = self
            .balance_of(mint, to)
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.custody.insert(*mint, custody - amount);
        self.balances.insert((*mint, *to), balance);
        Ok(())
    }
}
