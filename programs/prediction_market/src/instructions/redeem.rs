//! Claims and Redemption
//!
//! After a market is resolved, participants claim what they are owed.
//!
//! ## Payout Calculation
//!
//! ```text
//! curve markets:     payout = winning_shares            (1 share = 1 collateral)
//! pari-mutuel:       payout = stake + ⌊losing_total · stake / winning_total⌋
//! ```
//!
//! For example, in a pari-mutuel market:
//! - Alice staked 2 on YES, Bob staked 3 on NO
//! - YES wins: Alice receives 2 + ⌊3 · 2 / 2⌋ = 5
//!
//! If nobody staked the winning outcome there is no one to pay the losing
//! pool to. Such a market settles as a refund: every participant claims
//! back exactly what they staked, on any outcome.
//!
//! Claimed positions are zeroed in full, so a second claim finds nothing.
//!
//! ## Creator Liquidity
//!
//! ```text
//! constant product:  payout = reserve[winner]
//! reserve value:     payout = collateral_held - (supply[winner] - reserve[winner])
//! ```
//!
//! A reserve-value creator keeps everything not owed to outstanding winning
//! shares, including the collateral paid for losing outcomes.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{from_wad, to_wad};
use crate::amm::PariMutuel;
use crate::errors::MarketError;
use crate::state::{CollateralVault, Market, Pool};

/// Event emitted when a participant claims
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Claimed {
    pub market: Pubkey,
    pub claimant: Pubkey,
    /// Shares or stake cleared from the position, wad
    pub shares_burned: u128,
    /// Collateral paid out
    pub payout: u64,
}

/// Event emitted when the creator takes back the pool's winning reserve
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityWithdrawn {
    pub market: Pubkey,
    pub creator: Pubkey,
    pub shares_burned: u128,
    pub payout: u64,
}

/// What a claim pays and which position entries it clears
struct Settlement {
    payout_wad: u128,
    cleared: Vec<usize>,
}

impl Market {
    /// Claim everything `participant` is owed, returning collateral paid.
    pub fn claim(&mut self, vault: &mut dyn CollateralVault, participant: Pubkey) -> Result<u64> {
        require!(self.is_resolved(), MarketError::NotResolved);
        let winning = self.winning_index()?;
        let position = self.position(&participant);

        let settlement = match &self.pool {
            Pool::ConstantProduct(_) | Pool::ReserveValue(_) => {
                let shares = position[winning];
                require!(shares > 0, MarketError::NothingToClaim);
                Settlement {
                    payout_wad: shares,
                    cleared: vec![winning],
                }
            }
            Pool::PariMutuel(pool) => {
                let winning_total = pool.total_stake[winning];
                if winning_total == 0 {
                    let staked = position.iter().try_fold(0u128, |acc, stake| {
                        acc.checked_add(*stake)
                            .ok_or_else(|| error!(MarketError::ArithmeticOverflow))
                    })?;
                    require!(staked > 0, MarketError::NothingToClaim);
                    Settlement {
                        payout_wad: staked,
                        cleared: (0..position.len()).collect(),
                    }
                } else {
                    let stake = position[winning];
                    require!(stake > 0, MarketError::NothingToClaim);
                    let losing_total = PariMutuel::losing_total(&pool.total_stake, winning)?;
                    Settlement {
                        payout_wad: PariMutuel::payout(stake, winning_total, losing_total)?,
                        cleared: vec![winning],
                    }
                }
            }
        };

        let shares_burned = settlement
            .cleared
            .iter()
            .map(|index| position[*index])
            .sum::<u128>();
        let payout = from_wad(settlement.payout_wad, self.collateral_decimals)?;
        let collateral_held = self
            .collateral_held
            .checked_sub(payout)
            .ok_or(MarketError::ArithmeticOverflow)?;

        let mut pool = self.pool.clone();
        match &mut pool {
            Pool::ConstantProduct(pool) => pool.burn(winning, shares_burned)?,
            Pool::ReserveValue(pool) => pool.burn(winning, shares_burned)?,
            Pool::PariMutuel(_) => {}
        }

        if payout > 0 {
            vault.withdraw(&self.collateral_mint, &participant, payout)?;
        }

        let mut cleared = position;
        for index in settlement.cleared {
            cleared[index] = 0;
        }
        self.positions.insert(participant, cleared);
        self.pool = pool;
        self.collateral_held = collateral_held;

        let event = Claimed {
            market: self.id,
            claimant: participant,
            shares_burned,
            payout,
        };
        emit!(event.clone());
        self.record(event);

        Ok(payout)
    }

    /// Creator redeems the pool's own stake in the winning outcome.
    ///
    /// Only curve markets keep an inventory; pari-mutuel pools have nothing
    /// for the creator to take.
    pub fn withdraw_liquidity(&mut self, vault: &mut dyn CollateralVault, caller: &Pubkey) -> Result<u64> {
        require!(self.is_resolved(), MarketError::NotResolved);
        require_keys_eq!(*caller, self.creator, MarketError::Unauthorized);
        let winning = self.winning_index()?;

        let mut pool = self.pool.clone();
        let (reserve, payout_wad) = match &mut pool {
            Pool::ConstantProduct(pool) => {
                let reserve = pool.reserves[winning];
                require!(reserve > 0, MarketError::NothingToClaim);
                pool.burn(winning, reserve)?;
                pool.reserves[winning] = 0;
                (reserve, reserve)
            }
            Pool::ReserveValue(pool) => {
                let reserve = pool.reserves[winning];
                require!(reserve > 0, MarketError::NothingToClaim);
                let outstanding = pool.supply[winning]
                    .checked_sub(reserve)
                    .ok_or(MarketError::ArithmeticOverflow)?;
                let payout_wad = to_wad(self.collateral_held, self.collateral_decimals)?
                    .checked_sub(outstanding)
                    .ok_or(MarketError::ArithmeticOverflow)?;
                pool.burn(winning, reserve)?;
                pool.reserves[winning] = 0;
                (reserve, payout_wad)
            }
            Pool::PariMutuel(_) => return err!(MarketError::NothingToClaim),
        };

        let payout = from_wad(payout_wad, self.collateral_decimals)?;
        let collateral_held = self
            .collateral_held
            .checked_sub(payout)
            .ok_or(MarketError::ArithmeticOverflow)?;

        if payout > 0 {
            vault.withdraw(&self.collateral_mint, caller, payout)?;
        }

        self.pool = pool;
        self.collateral_held = collateral_held;

        let event = LiquidityWithdrawn {
            market: self.id,
            creator: *caller,
            shares_burned: reserve,
            payout,
        };
        emit!(event.clone());
        self.record(event);

        msg!("Market {} liquidity withdrawn: {}", self.id, payout);

        Ok(payout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::fixed_point::WAD;
    use crate::errors::assert_market_error;
    use crate::instructions::CreateMarketParams;
    use crate::state::{Category, EngineConfig, InMemoryVault};

    const USDC: u64 = 1_000_000;

    struct Fixture {
        vault: InMemoryVault,
        usdc: Pubkey,
        creator: Pubkey,
        oracle: Pubkey,
        alice: Pubkey,
        bob: Pubkey,
        charlie: Pubkey,
    }

    impl Fixture {
        fn new() -> Self {
            let usdc = Pubkey::new_unique();
            let mut f = Self {
                vault: InMemoryVault::new(),
                usdc,
                creator: Pubkey::new_unique(),
                oracle: Pubkey::new_unique(),
                alice: Pubkey::new_unique(),
                bob: Pubkey::new_unique(),
                charlie: Pubkey::new_unique(),
            };
            for owner in [f.creator, f.alice, f.bob, f.charlie] {
                f.vault.mint(&usdc, &owner, 10_000 * USDC).unwrap();
                f.vault.approve(&usdc, &owner, 10_000 * USDC);
            }
            f
        }

        fn open(&mut self, params: CreateMarketParams) -> Market {
            Market::open(
                &mut self.vault,
                Pubkey::new_unique(),
                0,
                self.creator,
                params,
                &EngineConfig::default(),
            )
            .unwrap()
        }

        fn balance(&self, owner: &Pubkey) -> u64 {
            self.vault.balance_of(&self.usdc, owner)
        }
    }

    #[test]
    fn test_pari_mutuel_yes_wins() {
        let mut f = Fixture::new();
        let params = CreateMarketParams::pari_mutuel_binary(
            "Will ETH reach $5000 by end of year?",
            Category::Crypto,
            f.oracle,
            f.usdc,
        );
        let mut market = f.open(params);

        market.place_bet(&mut f.vault, f.alice, 0, 2 * USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.bob, 1, 3 * USDC, 0).unwrap();

        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NotResolved);
        market.resolve(&f.oracle, 0).unwrap();

        assert_market_error(market.claim(&mut f.vault, f.bob), MarketError::NothingToClaim);

        let before = f.balance(&f.alice);
        assert_eq!(market.claim(&mut f.vault, f.alice).unwrap(), 5 * USDC);
        assert_eq!(f.balance(&f.alice) - before, 5 * USDC);
        assert_eq!(market.position(&f.alice), vec![0, 0]);

        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NothingToClaim);
        assert_eq!(f.vault.custody(&f.usdc), 0);
    }

    #[test]
    fn test_pari_mutuel_nway() {
        let mut f = Fixture::new();
        let labels = vec!["A".into(), "B".into(), "C".into()];
        let params = CreateMarketParams::pari_mutuel_nway(
            "Who will win the election?",
            Category::Elections,
            f.oracle,
            f.usdc,
            labels,
        );
        let mut market = f.open(params);

        market.place_bet(&mut f.vault, f.alice, 0, USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.bob, 1, USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.bob, 1, USDC, 0).unwrap();
        for _ in 0..3 {
            market.place_bet(&mut f.vault, f.charlie, 2, USDC, 0).unwrap();
        }
        market.resolve(&f.oracle, 1).unwrap();

        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NothingToClaim);
        assert_market_error(market.claim(&mut f.vault, f.charlie), MarketError::NothingToClaim);
        assert_eq!(market.claim(&mut f.vault, f.bob).unwrap(), 6 * USDC);
    }

    #[test]
    fn test_pari_mutuel_sole_winner_gets_stake_back() {
        let mut f = Fixture::new();
        let params = CreateMarketParams::pari_mutuel_binary("Q", Category::Crypto, f.oracle, f.usdc);
        let mut market = f.open(params);
        market.place_bet(&mut f.vault, f.alice, 0, 2 * USDC, 0).unwrap();
        market.resolve(&f.oracle, 0).unwrap();

        assert_eq!(market.claim(&mut f.vault, f.alice).unwrap(), 2 * USDC);
    }

    #[test]
    fn test_pari_mutuel_empty_winning_side_refunds() {
        let mut f = Fixture::new();
        let labels = vec!["A".into(), "B".into(), "C".into()];
        let params =
            CreateMarketParams::pari_mutuel_nway("Q", Category::Sports, f.oracle, f.usdc, labels);
        let mut market = f.open(params);
        market.place_bet(&mut f.vault, f.alice, 0, 2 * USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.alice, 1, USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.bob, 1, 4 * USDC, 0).unwrap();
        market.resolve(&f.oracle, 2).unwrap();

        assert_eq!(market.claim(&mut f.vault, f.alice).unwrap(), 3 * USDC);
        assert_eq!(market.claim(&mut f.vault, f.bob).unwrap(), 4 * USDC);
        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NothingToClaim);
        assert_eq!(market.collateral_held, 0);
    }

    #[test]
    fn test_cpmm_claim_pays_shares_one_to_one() {
        let mut f = Fixture::new();
        let params =
            CreateMarketParams::cpmm_binary("Q", Category::Crypto, f.oracle, f.usdc, 500 * USDC);
        let mut market = f.open(params);

        market.place_bet(&mut f.vault, f.alice, 0, 100 * USDC, 0).unwrap();
        market.place_bet(&mut f.vault, f.bob, 1, 50 * USDC, 0).unwrap();
        market.resolve(&f.oracle, 0).unwrap();

        let shares = market.position(&f.alice)[0];
        let paid = market.claim(&mut f.vault, f.alice).unwrap();
        assert_eq!(paid, from_wad(shares, 6).unwrap());
        assert_eq!(market.position(&f.alice)[0], 0);
        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NothingToClaim);
        assert_market_error(market.claim(&mut f.vault, f.bob), MarketError::NothingToClaim);

        // creator takes the pool's remaining YES inventory
        assert_market_error(
            market.withdraw_liquidity(&mut f.vault, &f.alice),
            MarketError::Unauthorized,
        );
        let reserve = market.pool.reserves()[0];
        let returned = market.withdraw_liquidity(&mut f.vault, &f.creator).unwrap();
        assert_eq!(returned, from_wad(reserve, 6).unwrap());
        assert_market_error(
            market.withdraw_liquidity(&mut f.vault, &f.creator),
            MarketError::NothingToClaim,
        );

        // 650 USDC went in; only floor dust below one micro-unit may remain
        assert_eq!(paid + returned, 650 * USDC - market.collateral_held);
        assert!(market.collateral_held <= 1);
        match &market.pool {
            Pool::ConstantProduct(pool) => assert_eq!(pool.supply[0], 0),
            other => panic!("unexpected pool {:?}", other),
        }
    }

    #[test]
    fn test_reserve_value_settlement() {
        let mut f = Fixture::new();
        let params =
            CreateMarketParams::reserve_value_binary("Q", Category::Crypto, f.oracle, f.usdc, 500 * USDC);
        let mut market = f.open(params);

        market.buy_shares(&mut f.vault, f.alice, 0, 100 * WAD, 125 * USDC).unwrap();
        market.buy_shares(&mut f.vault, f.alice, 0, 100 * WAD, 208_333_334).unwrap();
        market.buy_shares(&mut f.vault, f.bob, 1, 100 * WAD, 125 * USDC).unwrap();
        assert_eq!(market.collateral_held, 958_333_334);
        market.resolve(&f.oracle, 0).unwrap();

        // Creator withdraws first; Alice's 200 shares stay covered
        let before = f.balance(&f.creator);
        assert_eq!(market.withdraw_liquidity(&mut f.vault, &f.creator).unwrap(), 758_333_334);
        assert_eq!(f.balance(&f.creator) - before, 758_333_334);
        assert_market_error(
            market.withdraw_liquidity(&mut f.vault, &f.creator),
            MarketError::NothingToClaim,
        );

        assert_market_error(market.claim(&mut f.vault, f.bob), MarketError::NothingToClaim);
        assert_eq!(market.claim(&mut f.vault, f.alice).unwrap(), 200 * USDC);
        assert_eq!(market.collateral_held, 0);
        assert_eq!(f.vault.custody(&f.usdc), 0);
        match &market.pool {
            Pool::ReserveValue(pool) => assert_eq!(pool.supply[0], 0),
            other => panic!("unexpected pool {:?}", other),
        }
    }

    #[test]
    fn test_cpmm_losing_shares_stay() {
        let mut f = Fixture::new();
        let params =
            CreateMarketParams::cpmm_binary("Q", Category::Crypto, f.oracle, f.usdc, 500 * USDC);
        let mut market = f.open(params);
        market.place_bet(&mut f.vault, f.alice, 1, 10 * USDC, 0).unwrap();
        market.resolve(&f.oracle, 0).unwrap();

        assert_market_error(market.claim(&mut f.vault, f.alice), MarketError::NothingToClaim);
        assert!(market.position(&f.alice)[1] > 10 * WAD);
    }
}
