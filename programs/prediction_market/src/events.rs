//! # Event Log
//!
//! Every state transition emits one event. Each market keeps its events in
//! order, and the stream is complete: folding it through
//! `MarketRegistry::replay` rebuilds the registry exactly.
//!
//! ```text
//! MarketCreated ─▶ (BetPlaced | SharesBought)* ─▶ MarketResolved ─▶ (Claimed | LiquidityWithdrawn)*
//! ```

use anchor_lang::prelude::*;

use crate::instructions::{
    BetPlaced, Claimed, LiquidityWithdrawn, MarketCreated, MarketResolved, SharesBought,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub enum MarketEvent {
    MarketCreated(MarketCreated),
    BetPlaced(BetPlaced),
    SharesBought(SharesBought),
    MarketResolved(MarketResolved),
    Claimed(Claimed),
    LiquidityWithdrawn(LiquidityWithdrawn),
}

impl MarketEvent {
    /// Market the event belongs to
    pub fn market(&self) -> Pubkey {
        match self {
            MarketEvent::MarketCreated(event) => event.market,
            MarketEvent::BetPlaced(event) => event.market,
            MarketEvent::SharesBought(event) => event.market,
            MarketEvent::MarketResolved(event) => event.market,
            MarketEvent::Claimed(event) => event.market,
            MarketEvent::LiquidityWithdrawn(event) => event.market,
        }
    }
}

impl From<MarketCreated> for MarketEvent {
    fn from(event: MarketCreated) -> Self {
        MarketEvent::MarketCreated(event)
    }
}

impl From<BetPlaced> for MarketEvent {
    fn from(event: BetPlaced) -> Self {
        MarketEvent::BetPlaced(event)
    }
}

impl From<SharesBought> for MarketEvent {
    fn from(event: SharesBought) -> Self {
        MarketEvent::SharesBought(event)
    }
}

impl From<MarketResolved> for MarketEvent {
    fn from(event: MarketResolved) -> Self {
        MarketEvent::MarketResolved(event)
    }
}

impl From<Claimed> for MarketEvent {
    fn from(event: Claimed) -> Self {
        MarketEvent::Claimed(event)
    }
}

impl From<LiquidityWithdrawn> for MarketEvent {
    fn from(event: LiquidityWithdrawn) -> Self {
        MarketEvent::LiquidityWithdrawn(event)
    }
}
