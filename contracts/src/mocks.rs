//! Test doubles for the engine's collaborators.
//!
//! - `MockPriceFeed`: aggregator-style feed whose rounds are set by hand
//! - `MockCollateralToken`: CEP-18 subset with an open `mint`
//! - `ReentrantCollateralToken`: re-enters the engine from `transfer_from`

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::U256;
use crate::engine::IssuanceEngineContractRef;
use crate::errors::EngineError;
use crate::types::RoundData;

const MILLIS_PER_SECOND: u64 = 1000;

/// Aggregator-style price feed with manually pushed rounds
#[odra::module]
pub struct MockPriceFeed {
    decimals: Var<u8>,
    round: Var<RoundData>,
}

#[odra::module]
impl MockPriceFeed {
    pub fn init(&mut self, decimals: u8, initial_answer: U256) {
        self.decimals.set(decimals);
        self.round.set(RoundData::default());
        self.update_answer(initial_answer);
    }

    /// Publish a new round stamped with the current block time
    pub fn update_answer(&mut self, answer: U256) {
        let now = self.env().get_block_time() / MILLIS_PER_SECOND;
        let round_id = self.round.get().unwrap_or_default().round_id + 1;
        self.round.set(RoundData {
            round_id,
            answer,
            started_at: now,
            updated_at: now,
            answered_in_round: round_id,
        });
    }

    /// Overwrite the latest round verbatim
    pub fn update_round_data(&mut self, round: RoundData) {
        self.round.set(round);
    }

    pub fn latest_round_data(&self) -> RoundData {
        self.round.get().unwrap_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(8)
    }
}

/// CEP-18 collateral token with unrestricted minting
#[odra::module]
pub struct MockCollateralToken {
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockCollateralToken {
    pub fn init(&mut self, symbol: String, decimals: u8) {
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or_default()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        let balance = self.balance_of(to) + amount;
        self.balances.set(&to, balance);
        let supply = self.total_supply() + amount;
        self.total_supply.set(supply);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.move_balance(sender, recipient, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            self.env().revert(EngineError::InsufficientAllowance);
        }
        self.move_balance(owner, recipient, amount);
        self.allowances.set(&(owner, spender), allowance - amount);
        true
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(EngineError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, to_balance);
    }
}

/// Collateral token that calls back into the engine while being pulled
#[odra::module]
pub struct ReentrantCollateralToken {
    engine: Var<Address>,
}

#[odra::module]
impl ReentrantCollateralToken {
    pub fn init(&mut self, engine: Address) {
        self.engine.set(engine);
    }

    pub fn decimals(&self) -> u8 {
        18
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        let _ = account;
        U256::zero()
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let _ = (recipient, amount);
        true
    }

    /// Re-enters the engine with a debt mint while the deposit is in flight
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let _ = recipient;
        if let Some(engine) = self.engine.get() {
            IssuanceEngineContractRef::new(self.env(), engine).mint_debt(amount, owner);
        }
        true
    }
}
