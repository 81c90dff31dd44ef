//! # Shared Market Book
//!
//! Thread-safe view over a set of markets. Each market sits behind its own
//! lock, so bets on different markets run in parallel while operations on
//! one market are applied one at a time, in the order they take the lock.
//!
//! ```text
//! RwLock<id → Arc<Mutex<Market>>>
//!   read  : look up a market, then lock only that market
//!   write : create or insert a market
//! ```
//!
//! The pause flag is an atomic shared by every caller, so an admin pause
//! takes effect for the next operation on any thread.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anchor_lang::prelude::*;

use crate::amm::Probabilities;
use crate::errors::MarketError;
use crate::instructions::CreateMarketParams;
use crate::registry::MarketRegistry;
use crate::state::{CollateralVault, EngineConfig, Market};

#[derive(Debug, Default)]
pub struct MarketBook {
    config: EngineConfig,
    paused: AtomicBool,
    markets: RwLock<BTreeMap<Pubkey, Arc<Mutex<Market>>>>,
}

impl MarketBook {
    /// Take over every market of `registry`
    pub fn new(registry: MarketRegistry) -> Self {
        let config = registry.config().clone();
        let markets = registry
            .into_markets()
            .into_iter()
            .map(|market| (market.id, Arc::new(Mutex::new(market))))
            .collect();

        Self {
            paused: AtomicBool::new(config.paused),
            config,
            markets: RwLock::new(markets),
        }
    }

    /// Current settings, with the live pause flag
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            paused: self.is_paused(),
            ..self.config.clone()
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause or unpause market creation and betting (admin only)
    pub fn set_paused(&self, caller: &Pubkey, paused: bool) -> Result<()> {
        require_keys_eq!(*caller, self.config.admin, MarketError::Unauthorized);
        self.paused.store(paused, Ordering::Release);
        msg!("Book paused: {}", paused);
        Ok(())
    }

    pub fn market_count(&self) -> u64 {
        self.markets.read().unwrap_or_else(PoisonError::into_inner).len() as u64
    }

    /// Open a new market under the next creation index, returning its id
    pub fn create_market(
        &self,
        vault: &mut dyn CollateralVault,
        creator: Pubkey,
        params: CreateMarketParams,
    ) -> Result<Pubkey> {
        require!(!self.is_paused(), MarketError::ProtocolPaused);

        let mut markets = self.markets.write().unwrap_or_else(PoisonError::into_inner);
        let index = markets.len() as u64;
        let id = MarketRegistry::market_address(index);
        require!(!markets.contains_key(&id), MarketError::MarketAlreadyExists);

        let market = Market::open(vault, id, index, creator, params, &self.config)?;
        markets.insert(id, Arc::new(Mutex::new(market)));
        Ok(id)
    }

    /// Add a market built elsewhere
    pub fn insert(&self, market: Market) -> Result<()> {
        let mut markets = self.markets.write().unwrap_or_else(PoisonError::into_inner);
        require!(!markets.contains_key(&market.id), MarketError::MarketAlreadyExists);
        markets.insert(market.id, Arc::new(Mutex::new(market)));
        Ok(())
    }

    /// Handle to a single market
    pub fn market(&self, id: &Pubkey) -> Result<Arc<Mutex<Market>>> {
        let markets = self.markets.read().unwrap_or_else(PoisonError::into_inner);
        markets
            .get(id)
            .cloned()
            .ok_or_else(|| error!(MarketError::MarketNotFound))
    }

    /// Run `f` with exclusive access to one market
    pub fn with_market<T>(&self, id: &Pubkey, f: impl FnOnce(&mut Market) -> Result<T>) -> Result<T> {
        let market = self.market(id)?;
        let mut market = market.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut market)
    }

    pub fn place_bet(
        &self,
        vault: &mut dyn CollateralVault,
        id: &Pubkey,
        bettor: Pubkey,
        outcome: u8,
        amount: u64,
        min_shares_out: u128,
    ) -> Result<u128> {
        require!(!self.is_paused(), MarketError::ProtocolPaused);
        self.with_market(id, |market| {
            market.place_bet(vault, bettor, outcome, amount, min_shares_out)
        })
    }

    pub fn buy_shares(
        &self,
        vault: &mut dyn CollateralVault,
        id: &Pubkey,
        buyer: Pubkey,
        outcome: u8,
        shares: u128,
        max_amount_in: u64,
    ) -> Result<u64> {
        require!(!self.is_paused(), MarketError::ProtocolPaused);
        self.with_market(id, |market| {
            market.buy_shares(vault, buyer, outcome, shares, max_amount_in)
        })
    }

    pub fn resolve(&self, id: &Pubkey, caller: &Pubkey, winning_outcome: u8) -> Result<()> {
        self.with_market(id, |market| market.resolve(caller, winning_outcome))
    }

    pub fn claim(&self, vault: &mut dyn CollateralVault, id: &Pubkey, participant: Pubkey) -> Result<u64> {
        self.with_market(id, |market| market.claim(vault, participant))
    }

    pub fn withdraw_liquidity(&self, vault: &mut dyn CollateralVault, id: &Pubkey, caller: &Pubkey) -> Result<u64> {
        self.with_market(id, |market| market.withdraw_liquidity(vault, caller))
    }

    pub fn get_reserves(&self, id: &Pubkey) -> Result<Vec<u128>> {
        self.with_market(id, |market| Ok(market.reserves()))
    }

    pub fn get_probabilities(&self, id: &Pubkey) -> Result<Probabilities> {
        self.with_market(id, |market| market.probabilities())
    }

    pub fn get_position(&self, id: &Pubkey, participant: &Pubkey) -> Result<Vec<u128>> {
        self.with_market(id, |market| Ok(market.position(participant)))
    }

    /// Copy of one market's current state
    pub fn snapshot(&self, id: &Pubkey) -> Result<Market> {
        self.with_market(id, |market| Ok(market.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::amm::fixed_point::{from_wad, WAD};
    use crate::errors::assert_market_error;
    use crate::state::{Category, InMemoryVault, ReplayVault};

    const USDC: u64 = 1_000_000;

    /// Vault shared across threads, locked per transfer
    struct SharedVault<'a>(&'a Mutex<InMemoryVault>);

    impl CollateralVault for SharedVault<'_> {
        fn deposit(&mut self, mint: &Pubkey, from: &Pubkey, amount: u64) -> Result<()> {
            self.0.lock().unwrap().deposit(mint, from, amount)
        }

        fn withdraw(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
            self.0.lock().unwrap().withdraw(mint, to, amount)
        }
    }

    fn binary(question: String) -> CreateMarketParams {
        CreateMarketParams::cpmm_binary(
            question,
            Category::Crypto,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            500 * USDC,
        )
    }

    fn registry_with(markets: usize) -> (MarketRegistry, Vec<Pubkey>) {
        let mut registry = MarketRegistry::initialize(EngineConfig::default()).unwrap();
        let ids = (0..markets)
            .map(|i| {
                registry
                    .create_market(&mut ReplayVault, Pubkey::new_unique(), binary(format!("Q{}", i)))
                    .unwrap()
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_parallel_bets_on_separate_markets() {
        let (registry, ids) = registry_with(4);
        let book = MarketBook::new(registry);

        thread::scope(|scope| {
            for id in &ids {
                let book = &book;
                scope.spawn(move || {
                    let mut vault = ReplayVault;
                    let bettor = Pubkey::new_unique();
                    book.place_bet(&mut vault, id, bettor, 0, 100 * USDC, 0).unwrap();
                });
            }
        });

        for id in &ids {
            assert_eq!(
                book.get_reserves(id).unwrap(),
                vec![416_666_666_666_666_666_667, 600 * WAD]
            );
        }
    }

    #[test]
    fn test_same_market_bets_serialize() {
        let (registry, ids) = registry_with(1);
        let mut sequential = registry.clone();
        let book = MarketBook::new(registry);
        let id = ids[0];

        // Equal bets on one outcome commute, so any interleaving must land
        // on the sequential result.
        thread::scope(|scope| {
            for _ in 0..8 {
                let book = &book;
                scope.spawn(move || {
                    book.place_bet(&mut ReplayVault, &id, Pubkey::new_unique(), 1, 10 * USDC, 0)
                        .unwrap();
                });
            }
        });
        for _ in 0..8 {
            sequential
                .place_bet(&mut ReplayVault, &id, Pubkey::new_unique(), 1, 10 * USDC)
                .unwrap();
        }

        let market = book.snapshot(&id).unwrap();
        assert_eq!(market.reserves(), sequential.get_reserves(&id).unwrap());
        assert_eq!(market.collateral_held, 580 * USDC);
        assert_eq!(market.history.len(), 9);
        assert_eq!(
            book.get_probabilities(&id).unwrap(),
            sequential.get_probabilities(&id).unwrap()
        );
    }

    #[test]
    fn test_concurrent_claims_pay_once() {
        let usdc = Pubkey::new_unique();
        let creator = Pubkey::new_unique();
        let oracle = Pubkey::new_unique();
        let bettors: Vec<Pubkey> = (0..8).map(|_| Pubkey::new_unique()).collect();

        let mut vault = InMemoryVault::new();
        for owner in bettors.iter().chain([&creator]) {
            vault.mint(&usdc, owner, 1_000 * USDC).unwrap();
            vault.approve(&usdc, owner, 1_000 * USDC);
        }

        let mut registry = MarketRegistry::initialize(EngineConfig::default()).unwrap();
        let id = registry
            .create_market(
                &mut vault,
                creator,
                CreateMarketParams::cpmm_binary("Q", Category::Sports, oracle, usdc, 500 * USDC),
            )
            .unwrap();
        for (i, bettor) in bettors.iter().enumerate() {
            registry
                .place_bet(&mut vault, &id, *bettor, (i % 2) as u8, (10 + i as u64) * USDC)
                .unwrap();
        }
        registry.resolve(&id, &oracle, 0).unwrap();

        let owed: u64 = bettors
            .iter()
            .map(|bettor| from_wad(registry.get_position(&id, bettor).unwrap()[0], 6).unwrap())
            .sum();
        let held = registry.get(&id).unwrap().collateral_held;

        let book = MarketBook::new(registry);
        let vault = Mutex::new(vault);

        // Every bettor claims twice at once
        let results: Vec<Result<u64>> = thread::scope(|scope| {
            let handles: Vec<_> = bettors
                .iter()
                .chain(bettors.iter())
                .map(|bettor| {
                    let (book, vault) = (&book, &vault);
                    scope.spawn(move || book.claim(&mut SharedVault(vault), &id, *bettor))
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        let paid: u64 = results.iter().filter_map(|result| result.as_ref().ok()).sum();
        let paid_claims = results.iter().filter(|result| matches!(result, Ok(p) if *p > 0)).count();
        assert_eq!(paid, owed);
        assert_eq!(paid_claims, 4);
        for result in results.into_iter().filter(|result| result.is_err()) {
            assert_market_error(result, MarketError::NothingToClaim);
        }

        let market = book.snapshot(&id).unwrap();
        assert_eq!(market.collateral_held, held - owed);
        assert_eq!(vault.lock().unwrap().custody(&usdc), market.collateral_held);
        for bettor in &bettors {
            assert_eq!(book.get_position(&id, bettor).unwrap()[0], 0);
        }
    }

    #[test]
    fn test_create_and_insert() {
        let book = MarketBook::default();
        let first = book.create_market(&mut ReplayVault, Pubkey::new_unique(), binary("Q0".into())).unwrap();
        let second = book.create_market(&mut ReplayVault, Pubkey::new_unique(), binary("Q1".into())).unwrap();
        assert_eq!(first, MarketRegistry::market_address(0));
        assert_eq!(second, MarketRegistry::market_address(1));
        assert_eq!(book.market_count(), 2);

        let copy = book.snapshot(&first).unwrap();
        assert_market_error(book.insert(copy), MarketError::MarketAlreadyExists);
        assert_eq!(book.snapshot(&first).unwrap().question, "Q0");
    }

    #[test]
    fn test_pause_is_shared() {
        let admin = Pubkey::new_unique();
        let registry = MarketRegistry::initialize(EngineConfig {
            admin,
            ..EngineConfig::default()
        })
        .unwrap();
        let book = MarketBook::new(registry);
        let id = book.create_market(&mut ReplayVault, admin, binary("Q".into())).unwrap();

        assert_market_error(book.set_paused(&Pubkey::new_unique(), true), MarketError::Unauthorized);
        thread::scope(|scope| {
            scope.spawn(|| book.set_paused(&admin, true).unwrap());
        });

        assert!(book.config().paused);
        assert_market_error(
            book.place_bet(&mut ReplayVault, &id, admin, 0, USDC, 0),
            MarketError::ProtocolPaused,
        );
        assert_market_error(
            book.buy_shares(&mut ReplayVault, &id, admin, 0, WAD, u64::MAX),
            MarketError::ProtocolPaused,
        );
        assert_market_error(
            book.create_market(&mut ReplayVault, admin, binary("Q".into())),
            MarketError::ProtocolPaused,
        );

        book.set_paused(&admin, false).unwrap();
        book.place_bet(&mut ReplayVault, &id, admin, 0, USDC, 0).unwrap();
    }

    #[test]
    fn test_missing_market() {
        let book = MarketBook::default();
        assert_market_error(
            book.snapshot(&Pubkey::new_unique()),
            MarketError::MarketNotFound,
        );
    }
}
