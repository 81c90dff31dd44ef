//! Engine Configuration
//!
//! Registry-wide settings that apply to every market it creates.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::WAD_DECIMALS;
use crate::errors::MarketError;

/// Hard ceiling on outcomes per market
pub const MAX_OUTCOMES: u8 = 16;

/// Labels used when a binary market is created without any
pub const DEFAULT_BINARY_LABELS: [&str; 2] = ["YES", "NO"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Administrator allowed to pause the registry
    pub admin: Pubkey,

    /// Collateral decimals assumed when a market does not state its own
    /// (6 for USDC)
    pub default_collateral_decimals: u8,

    /// Minimum seed liquidity for curve markets, in collateral units
    pub min_liquidity: u64,

    /// Maximum question length in bytes
    pub max_question_len: usize,

    /// Maximum outcomes for N-way markets
    pub max_outcomes: u8,

    /// Stake taken by a pari-mutuel unit bet, in collateral units
    pub unit_stake: u64,

    /// Whether market creation and betting are paused
    pub paused: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin: Pubkey::default(),
            default_collateral_decimals: 6,
            min_liquidity: 1_000_000, // 1 token with 6 decimals
            max_question_len: 256,
            max_outcomes: MAX_OUTCOMES,
            unit_stake: 1_000_000,
            paused: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.default_collateral_decimals <= WAD_DECIMALS,
            MarketError::InvalidConfig
        );
        require!(
            (2..=MAX_OUTCOMES).contains(&self.max_outcomes),
            MarketError::InvalidConfig
        );
        require!(self.max_question_len > 0, MarketError::InvalidConfig);
        require!(self.unit_stake > 0, MarketError::InvalidConfig);
        Ok(())
    }
}
