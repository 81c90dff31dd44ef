//! Prediction Market State
//!
//! Each market is a single question with its own pool, positions and
//! append-only event history.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::amm::Probabilities;
use crate::errors::MarketError;
use crate::events::MarketEvent;
use crate::state::Pool;

/// A single prediction market
#[derive(Clone, Debug, PartialEq)]
pub struct Market {
    /// Market identifier, derived from `index`
    pub id: Pubkey,

    /// Creation order within the registry
    pub index: u64,

    /// Market creator, who also supplied the seed liquidity
    pub creator: Pubkey,

    /// The prediction question
    /// Example: "Will ETH reach $5000 by end of year?"
    pub question: String,

    pub category: Category,

    pub kind: MarketKind,

    /// Identity authorized to resolve the market
    pub oracle: Pubkey,

    /// Settlement token
    pub collateral_mint: Pubkey,

    /// Decimals of the settlement token
    pub collateral_decimals: u8,

    /// One label per outcome, index-aligned with the pool
    pub outcome_labels: Vec<String>,

    pub status: MarketStatus,

    /// Winning outcome (only set after resolution)
    pub winning_outcome: Option<u8>,

    /// Pool state for the market's kind
    pub pool: Pool,

    /// Per-participant shares (curve markets) or stakes (pari-mutuel), wad
    pub positions: BTreeMap<Pubkey, Vec<u128>>,

    /// Collateral held in custody for this market
    pub collateral_held: u64,

    /// Every event this market has emitted, oldest first
    pub history: Vec<MarketEvent>,
}

impl Market {
    pub const SEED: &'static [u8] = b"market";

    pub fn outcome_count(&self) -> usize {
        self.outcome_labels.len()
    }

    pub fn is_resolved(&self) -> bool {
        self.status == MarketStatus::Resolved
    }

    /// Check `outcome` against this market and widen it for indexing.
    pub fn outcome_index(&self, outcome: u8) -> Result<usize> {
        let index = outcome as usize;
        require!(index < self.outcome_count(), MarketError::InvalidOutcome);
        Ok(index)
    }

    /// Position of `participant`, all zeros if they never bet
    pub fn position(&self, participant: &Pubkey) -> Vec<u128> {
        self.positions
            .get(participant)
            .cloned()
            .unwrap_or_else(|| vec![0; self.outcome_count()])
    }

    /// Pool-side quantity per outcome: reserves or stake totals (wad)
    pub fn reserves(&self) -> Vec<u128> {
        self.pool.reserves().to_vec()
    }

    /// Live odds while open; certainty on the winner once resolved
    pub fn probabilities(&self) -> Result<Probabilities> {
        match self.winning_outcome {
            Some(outcome) => Ok(Probabilities::settled(
                self.outcome_count(),
                self.outcome_index(outcome)?,
            )),
            None => self.pool.probabilities(),
        }
    }

    pub(crate) fn record(&mut self, event: impl Into<MarketEvent>) {
        self.history.push(event.into());
    }
}

/// Market category used by the registry index
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum Category {
    Sports,
    Elections,
    Crypto,
    Entertainment,
    Misc,
    #[default]
    Other,
}

/// Pricing model and outcome arity
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum MarketKind {
    /// YES/NO constant-product pool
    CpmmBinary,
    /// Constant-product pool over N outcomes
    CpmmNWay,
    /// YES/NO stake-weighted pool
    ParimutuelBinary,
    /// Stake-weighted pool over N outcomes
    ParimutuelNWay,
    /// YES/NO pre-minted shares, each side priced by its collateral value
    ReserveValueBinary,
    /// Pre-minted shares over N outcomes, priced per outcome
    ReserveValueNWay,
}

impl MarketKind {
    pub fn is_reserve_value(&self) -> bool {
        matches!(self, MarketKind::ReserveValueBinary | MarketKind::ReserveValueNWay)
    }

    pub fn is_pari_mutuel(&self) -> bool {
        matches!(self, MarketKind::ParimutuelBinary | MarketKind::ParimutuelNWay)
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            MarketKind::CpmmBinary | MarketKind::ParimutuelBinary | MarketKind::ReserveValueBinary
        )
    }
}

/// Market lifecycle status
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MarketStatus {
    /// Market is open for betting
    #[default]
    Open,
    /// Market has been resolved (terminal)
    Resolved,
}
