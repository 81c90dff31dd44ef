//! Operation handlers for the market engine
//!
//! Each handler is a state transition on a single `Market`:
//! - `create_market` - Open a market and seed its pool
//! - `trade` - Place a bet on an outcome, or buy an exact number of shares
//! - `resolve` - Declare the winning outcome (oracle only)
//! - `redeem` - Claim winnings, or withdraw the creator's liquidity

pub mod create_market;
pub mod redeem;
pub mod resolve;
pub mod trade;

pub use create_market::*;
pub use redeem::*;
pub use resolve::*;
pub use trade::*;
