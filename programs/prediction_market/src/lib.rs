//! # Outcome AMM: Prediction Market Engine
//!
//! Binary and multi-outcome prediction markets with three pricing models.
//!
//! ## Overview
//!
//! Anyone can open a market on a question, bet collateral on an outcome and,
//! once the market's oracle declares the result, claim what they are owed.
//!
//! ## How it works
//! - Constant-product markets price outcome shares on an `x · y = k` curve
//!   seeded by the creator's liquidity. One winning share redeems for one
//!   unit of collateral.
//! - Reserve-value markets pre-mint the creator's liquidity as shares and
//!   sell each outcome's shares against the collateral already paid for
//!   them. Buyers can ask for an exact number of shares.
//! - Pari-mutuel markets simply pool stakes. Winners split the losing pool
//!   in proportion to what they staked.
//! - Every state change is recorded as an event, and the event log alone is
//!   enough to rebuild the registry.
//!

use anchor_lang::prelude::*;

pub mod amm;
pub mod book;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod registry;
pub mod state;

pub use amm::*;
pub use book::MarketBook;
pub use errors::MarketError;
pub use events::MarketEvent;
pub use instructions::*;
pub use registry::MarketRegistry;
pub use state::*;

// Namespace for market id derivation
declare_id!("9ULSD9MEGFhSFaT7HpAkHv9MmdZKWBQbgZAWCAJcUaWT");
