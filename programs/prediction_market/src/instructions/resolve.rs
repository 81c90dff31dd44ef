//! Market Resolution
//!
//! ## Resolution Flow
//!
//! 1. The market's oracle determines the real-world result
//! 2. Oracle calls `resolve` with the winning outcome index
//! 3. Market transitions `Open → Resolved` (terminal, no way back)
//! 4. Winners can claim
//!
//! The oracle is fixed when the market is created. It can be an AI agent's
//! key, a multisig, or any other identity the creator trusts.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::state::{Market, MarketStatus};

/// Event emitted when a market is resolved
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct MarketResolved {
    pub market: Pubkey,
    pub resolver: Pubkey,
    pub winning_outcome: u8,
}

impl Market {
    /// Resolve the market with the winning outcome
    pub fn resolve(&mut self, caller: &Pubkey, winning_outcome: u8) -> Result<()> {
        require_keys_eq!(*caller, self.oracle, MarketError::Unauthorized);
        require!(!self.is_resolved(), MarketError::AlreadyResolved);
        let index = self.outcome_index(winning_outcome)?;

        self.status = MarketStatus::Resolved;
        self.winning_outcome = Some(winning_outcome);

        let event = MarketResolved {
            market: self.id,
            resolver: *caller,
            winning_outcome,
        };
        emit!(event.clone());
        self.record(event);

        msg!(
            "Market {} resolved: {}",
            self.id,
            self.outcome_labels[index]
        );

        Ok(())
    }

    /// Winning outcome as an index, failing before resolution
    pub fn winning_index(&self) -> Result<usize> {
        match (self.status, self.winning_outcome) {
            (MarketStatus::Resolved, Some(outcome)) => self.outcome_index(outcome),
            _ => err!(MarketError::NotResolved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_market_error;
    use crate::instructions::CreateMarketParams;
    use crate::state::{Category, EngineConfig, ReplayVault};

    fn market(oracle: Pubkey) -> Market {
        let params = CreateMarketParams::pari_mutuel_nway(
            "Who will win the election?",
            Category::Elections,
            oracle,
            Pubkey::new_unique(),
            vec!["A".into(), "B".into(), "C".into()],
        );
        Market::open(
            &mut ReplayVault,
            Pubkey::new_unique(),
            0,
            Pubkey::new_unique(),
            params,
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_only_oracle_resolves() {
        let oracle = Pubkey::new_unique();
        let mut market = market(oracle);

        assert_market_error(
            market.resolve(&Pubkey::new_unique(), 0),
            MarketError::Unauthorized,
        );
        assert!(!market.is_resolved());

        market.resolve(&oracle, 2).unwrap();
        assert!(market.is_resolved());
        assert_eq!(market.winning_outcome, Some(2));
        assert_eq!(market.winning_index().unwrap(), 2);
    }

    #[test]
    fn test_resolution_is_irrevocable() {
        let oracle = Pubkey::new_unique();
        let mut market = market(oracle);
        market.resolve(&oracle, 1).unwrap();
        let resolved = market.clone();

        assert_market_error(market.resolve(&oracle, 0), MarketError::AlreadyResolved);
        assert_eq!(market, resolved);
    }

    #[test]
    fn test_out_of_range_outcome() {
        let oracle = Pubkey::new_unique();
        let mut market = market(oracle);
        assert_market_error(market.resolve(&oracle, 3), MarketError::InvalidOutcome);
        assert!(!market.is_resolved());
        assert_market_error(market.winning_index(), MarketError::NotResolved);
    }
}
