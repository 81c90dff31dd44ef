//! Permissionless Market Creation
//!
//! Anyone can open a market by:
//! 1. Defining the question and its outcomes
//! 2. Choosing a pricing model (constant product, reserve value or pari-mutuel)
//! 3. Providing seed liquidity (curve markets only)
//!
//! Seed liquidity becomes the pool's own inventory: every outcome reserve
//! starts at the seed amount, so a fresh market shows even odds.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{to_wad, WAD_DECIMALS};
use crate::errors::MarketError;
use crate::state::{
    Category, CollateralVault, ConstantProductPool, EngineConfig, Market, MarketKind,
    MarketStatus, PariMutuelPool, Pool, ReserveValuePool, DEFAULT_BINARY_LABELS,
};

/// Event emitted when a new market is created
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct MarketCreated {
    pub market: Pubkey,
    pub index: u64,
    pub creator: Pubkey,
    pub question: String,
    pub category: Category,
    pub kind: MarketKind,
    pub oracle: Pubkey,
    pub collateral_mint: Pubkey,
    pub collateral_decimals: u8,
    pub outcome_labels: Vec<String>,
    pub initial_liquidity: u64,
}

/// Everything a caller supplies to open a market
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateMarketParams {
    pub question: String,
    pub category: Category,
    pub kind: MarketKind,
    pub oracle: Pubkey,
    pub collateral_mint: Pubkey,
    /// Falls back to the registry default (6) when unset
    pub collateral_decimals: Option<u8>,
    /// Empty for binary markets means `["YES", "NO"]`
    pub outcome_labels: Vec<String>,
    /// Seed liquidity in collateral units; zero for pari-mutuel markets
    pub initial_liquidity: u64,
}

impl CreateMarketParams {
    /// YES/NO constant-product market
    pub fn cpmm_binary(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
        initial_liquidity: u64,
    ) -> Self {
        Self {
            question: question.into(),
            category,
            kind: MarketKind::CpmmBinary,
            oracle,
            collateral_mint,
            collateral_decimals: None,
            outcome_labels: Vec::new(),
            initial_liquidity,
        }
    }

    /// Constant-product market over the given outcomes
    pub fn cpmm_nway(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
        outcome_labels: Vec<String>,
        initial_liquidity: u64,
    ) -> Self {
        Self {
            kind: MarketKind::CpmmNWay,
            outcome_labels,
            ..Self::cpmm_binary(question, category, oracle, collateral_mint, initial_liquidity)
        }
    }

    /// YES/NO reserve-value market
    pub fn reserve_value_binary(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
        initial_liquidity: u64,
    ) -> Self {
        Self {
            kind: MarketKind::ReserveValueBinary,
            ..Self::cpmm_binary(question, category, oracle, collateral_mint, initial_liquidity)
        }
    }

    /// Reserve-value market over the given outcomes
    pub fn reserve_value_nway(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
        outcome_labels: Vec<String>,
        initial_liquidity: u64,
    ) -> Self {
        Self {
            kind: MarketKind::ReserveValueNWay,
            outcome_labels,
            ..Self::cpmm_binary(question, category, oracle, collateral_mint, initial_liquidity)
        }
    }

    /// YES/NO pari-mutuel market
    pub fn pari_mutuel_binary(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
    ) -> Self {
        Self {
            kind: MarketKind::ParimutuelBinary,
            ..Self::cpmm_binary(question, category, oracle, collateral_mint, 0)
        }
    }

    /// Pari-mutuel market over the given outcomes
    pub fn pari_mutuel_nway(
        question: impl Into<String>,
        category: Category,
        oracle: Pubkey,
        collateral_mint: Pubkey,
        outcome_labels: Vec<String>,
    ) -> Self {
        Self {
            kind: MarketKind::ParimutuelNWay,
            outcome_labels,
            ..Self::cpmm_binary(question, category, oracle, collateral_mint, 0)
        }
    }

    fn resolve_labels(&self, config: &EngineConfig) -> Result<Vec<String>> {
        let labels = if self.kind.is_binary() && self.outcome_labels.is_empty() {
            DEFAULT_BINARY_LABELS.iter().map(|label| label.to_string()).collect()
        } else {
            self.outcome_labels.clone()
        };

        let valid = if self.kind.is_binary() {
            labels.len() == 2
        } else {
            (2..=config.max_outcomes as usize).contains(&labels.len())
        };
        require!(valid, MarketError::InvalidOutcomeCount);
        Ok(labels)
    }
}

impl Market {
    /// Validate `params`, pull the seed liquidity from `creator` and build
    /// the market. Nothing is kept if the vault refuses the deposit.
    pub fn open(
        vault: &mut dyn CollateralVault,
        id: Pubkey,
        index: u64,
        creator: Pubkey,
        params: CreateMarketParams,
        config: &EngineConfig,
    ) -> Result<Market> {
        require!(
            params.question.len() <= config.max_question_len,
            MarketError::QuestionTooLong
        );
        let collateral_decimals = params
            .collateral_decimals
            .unwrap_or(config.default_collateral_decimals);
        require!(collateral_decimals <= WAD_DECIMALS, MarketError::InvalidConfig);
        let outcome_labels = params.resolve_labels(config)?;

        let pool = if params.kind.is_pari_mutuel() {
            require!(params.initial_liquidity == 0, MarketError::UnexpectedLiquidity);
            Pool::PariMutuel(PariMutuelPool::new(outcome_labels.len()))
        } else {
            require!(
                params.initial_liquidity > 0 && params.initial_liquidity >= config.min_liquidity,
                MarketError::InsufficientLiquidity
            );
            let seed = to_wad(params.initial_liquidity, collateral_decimals)?;
            if params.kind.is_reserve_value() {
                Pool::ReserveValue(ReserveValuePool::seed(outcome_labels.len(), seed)?)
            } else {
                Pool::ConstantProduct(ConstantProductPool::seed(outcome_labels.len(), seed)?)
            }
        };

        if params.initial_liquidity > 0 {
            vault.deposit(&params.collateral_mint, &creator, params.initial_liquidity)?;
        }

        let mut market = Market {
            id,
            index,
            creator,
            question: params.question,
            category: params.category,
            kind: params.kind,
            oracle: params.oracle,
            collateral_mint: params.collateral_mint,
            collateral_decimals,
            outcome_labels,
            status: MarketStatus::Open,
            winning_outcome: None,
            pool,
            positions: BTreeMap::new(),
            collateral_held: params.initial_liquidity,
            history: Vec::new(),
        };

        let event = MarketCreated {
            market: market.id,
            index,
            creator,
            question: market.question.clone(),
            category: market.category,
            kind: market.kind,
            oracle: market.oracle,
            collateral_mint: market.collateral_mint,
            collateral_decimals,
            outcome_labels: market.outcome_labels.clone(),
            initial_liquidity: params.initial_liquidity,
        };
        emit!(event.clone());
        market.record(event);

        msg!("Market {} created: {:?} with {} outcomes", market.id, market.kind, market.outcome_count());

        Ok(market)
    }
}
