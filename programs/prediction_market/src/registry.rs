//! # Market Registry
//!
//! Owns every market, assigns identifiers and routes operations to the
//! right market. Market ids are derived from the creation index:
//!
//! ```text
//! id = find_program_address(["market", index.to_le_bytes()], crate::ID)
//! ```
//!
//! so the same sequence of creations always produces the same ids, which
//! is what lets `replay` rebuild a registry from its event log.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::amm::Probabilities;
use crate::errors::MarketError;
use crate::events::MarketEvent;
use crate::instructions::CreateMarketParams;
use crate::state::{Category, CollateralVault, EngineConfig, Market, ReplayVault};

#[derive(Clone, Debug)]
pub struct MarketRegistry {
    config: EngineConfig,
    markets: BTreeMap<Pubkey, Market>,
    /// Market ids in creation order
    order: Vec<Pubkey>,
    by_category: BTreeMap<Category, Vec<Pubkey>>,
}

impl MarketRegistry {
    /// Create an empty registry governed by `config`
    pub fn initialize(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        msg!("Market registry initialized");
        msg!("Admin: {}", config.admin);
        msg!("Min liquidity: {}", config.min_liquidity);

        Ok(Self {
            config,
            markets: BTreeMap::new(),
            order: Vec::new(),
            by_category: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pause or unpause market creation and betting (admin only)
    pub fn set_paused(&mut self, caller: &Pubkey, paused: bool) -> Result<()> {
        require_keys_eq!(*caller, self.config.admin, MarketError::Unauthorized);
        self.config.paused = paused;
        msg!("Registry paused: {}", paused);
        Ok(())
    }

    pub fn market_count(&self) -> u64 {
        self.order.len() as u64
    }

    /// Id the market created at `index` has (or will have)
    pub fn market_address(index: u64) -> Pubkey {
        Pubkey::find_program_address(&[Market::SEED, &index.to_le_bytes()], &crate::ID).0
    }

    /// Open a new market, returning its id
    pub fn create_market(
        &mut self,
        vault: &mut dyn CollateralVault,
        creator: Pubkey,
        params: CreateMarketParams,
    ) -> Result<Pubkey> {
        require!(!self.config.paused, MarketError::ProtocolPaused);

        let index = self.market_count();
        let id = Self::market_address(index);
        let market = Market::open(vault, id, index, creator, params, &self.config)?;

        self.by_category.entry(market.category).or_default().push(id);
        self.order.push(id);
        self.markets.insert(id, market);

        Ok(id)
    }

    pub fn get(&self, market: &Pubkey) -> Result<&Market> {
        self.markets
            .get(market)
            .ok_or_else(|| error!(MarketError::MarketNotFound))
    }

    pub fn get_mut(&mut self, market: &Pubkey) -> Result<&mut Market> {
        self.markets
            .get_mut(market)
            .ok_or_else(|| error!(MarketError::MarketNotFound))
    }

    /// All markets in creation order
    pub fn markets(&self) -> impl Iterator<Item = &Market> + '_ {
        self.order.iter().filter_map(|id| self.markets.get(id))
    }

    /// Markets of one category in creation order
    pub fn markets_by_category(&self, category: Category) -> Vec<&Market> {
        self.by_category
            .get(&category)
            .map(|ids| ids.iter().filter_map(|id| self.markets.get(id)).collect())
            .unwrap_or_default()
    }

    /// Bet `amount` collateral on `outcome`, accepting any fill
    pub fn place_bet(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        bettor: Pubkey,
        outcome: u8,
        amount: u64,
    ) -> Result<u128> {
        self.place_bet_with_limit(vault, market, bettor, outcome, amount, 0)
    }

    /// Bet `amount` collateral on `outcome`, failing below `min_shares_out`
    pub fn place_bet_with_limit(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        bettor: Pubkey,
        outcome: u8,
        amount: u64,
        min_shares_out: u128,
    ) -> Result<u128> {
        require!(!self.config.paused, MarketError::ProtocolPaused);
        self.get_mut(market)?
            .place_bet(vault, bettor, outcome, amount, min_shares_out)
    }

    /// Bet the configured unit stake on `outcome`
    pub fn place_unit_bet(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        bettor: Pubkey,
        outcome: u8,
    ) -> Result<u128> {
        let unit = self.config.unit_stake;
        self.place_bet(vault, market, bettor, outcome, unit)
    }

    pub fn quote_bet(&self, market: &Pubkey, outcome: u8, amount: u64) -> Result<u128> {
        self.get(market)?.quote_bet(outcome, amount)
    }

    /// Buy exactly `shares` of `outcome`, paying at most `max_amount_in`
    pub fn buy_shares(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        buyer: Pubkey,
        outcome: u8,
        shares: u128,
        max_amount_in: u64,
    ) -> Result<u64> {
        require!(!self.config.paused, MarketError::ProtocolPaused);
        self.get_mut(market)?
            .buy_shares(vault, buyer, outcome, shares, max_amount_in)
    }

    pub fn quote_shares(&self, market: &Pubkey, outcome: u8, shares: u128) -> Result<u64> {
        self.get(market)?.quote_shares(outcome, shares)
    }

    pub fn get_reserves(&self, market: &Pubkey) -> Result<Vec<u128>> {
        Ok(self.get(market)?.reserves())
    }

    pub fn get_probabilities(&self, market: &Pubkey) -> Result<Probabilities> {
        self.get(market)?.probabilities()
    }

    pub fn get_position(&self, market: &Pubkey, participant: &Pubkey) -> Result<Vec<u128>> {
        Ok(self.get(market)?.position(participant))
    }

    pub fn resolve(&mut self, market: &Pubkey, caller: &Pubkey, winning_outcome: u8) -> Result<()> {
        self.get_mut(market)?.resolve(caller, winning_outcome)
    }

    pub fn claim(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        participant: Pubkey,
    ) -> Result<u64> {
        self.get_mut(market)?.claim(vault, participant)
    }

    pub fn withdraw_liquidity(
        &mut self,
        vault: &mut dyn CollateralVault,
        market: &Pubkey,
        caller: &Pubkey,
    ) -> Result<u64> {
        self.get_mut(market)?.withdraw_liquidity(vault, caller)
    }

    /// Every event, market by market in creation order
    pub fn events(&self) -> Vec<MarketEvent> {
        self.markets()
            .flat_map(|market| market.history.iter().cloned())
            .collect()
    }

    /// Rebuild a registry by re-executing `events` against `config`.
    ///
    /// Every operation must reproduce the event it is replaying, field for
    /// field, or the replay fails with `ReplayMismatch`. Transfers are not
    /// repeated. The pause flag is honored only once the log is applied.
    pub fn replay(config: EngineConfig, events: &[MarketEvent]) -> Result<Self> {
        let paused = config.paused;
        let mut registry = Self::initialize(EngineConfig {
            paused: false,
            ..config
        })?;
        let mut vault = ReplayVault;

        for event in events {
            match event {
                MarketEvent::MarketCreated(created) => {
                    require!(
                        created.index == registry.market_count(),
                        MarketError::ReplayMismatch
                    );
                    let params = CreateMarketParams {
                        question: created.question.clone(),
                        category: created.category,
                        kind: created.kind,
                        oracle: created.oracle,
                        collateral_mint: created.collateral_mint,
                        collateral_decimals: Some(created.collateral_decimals),
                        outcome_labels: created.outcome_labels.clone(),
                        initial_liquidity: created.initial_liquidity,
                    };
                    registry.create_market(&mut vault, created.creator, params)?;
                }
                MarketEvent::BetPlaced(bet) => {
                    registry.place_bet(&mut vault, &bet.market, bet.bettor, bet.outcome, bet.amount)?;
                }
                MarketEvent::SharesBought(bought) => {
                    registry.buy_shares(
                        &mut vault,
                        &bought.market,
                        bought.buyer,
                        bought.outcome,
                        bought.shares,
                        bought.amount,
                    )?;
                }
                MarketEvent::MarketResolved(resolved) => {
                    registry.resolve(&resolved.market, &resolved.resolver, resolved.winning_outcome)?;
                }
                MarketEvent::Claimed(claimed) => {
                    registry.claim(&mut vault, &claimed.market, claimed.claimant)?;
                }
                MarketEvent::LiquidityWithdrawn(withdrawn) => {
                    registry.withdraw_liquidity(&mut vault, &withdrawn.market, &withdrawn.creator)?;
                }
            }

            let replayed = registry.get(&event.market())?.history.last();
            require!(replayed == Some(event), MarketError::ReplayMismatch);
        }

        registry.config.paused = paused;
        msg!("Replayed {} events into {} markets", events.len(), registry.market_count());
        Ok(registry)
    }

    /// Hand the markets over, in creation order
    pub fn into_markets(self) -> Vec<Market> {
        let Self {
            mut markets, order, ..
        } = self;
        order
            .iter()
            .filter_map(|id| markets.remove(id))
            .collect()
    }
}
