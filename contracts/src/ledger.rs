//! Collateral ledger: accepted assets, per-user deposits and per-user debt.
//!
//! The ledger only moves numbers. Solvency checks and token custody belong to
//! the engine that owns it.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::{or_revert, EngineError};
use crate::math::{checked_add, checked_sub, MAX_COLLATERAL_DECIMALS};
use crate::types::CollateralAsset;

/// New collateral accepted
#[odra::event]
pub struct CollateralRegistered {
    pub token: Address,
    pub price_feed: Address,
    pub decimals: u8,
}

/// Collateral repointed to another price feed
#[odra::event]
pub struct CollateralFeedUpdated {
    pub token: Address,
    pub previous_feed: Address,
    pub new_feed: Address,
}

/// Collateral registry and user positions
#[odra::module(events = [CollateralRegistered, CollateralFeedUpdated])]
pub struct CollateralLedger {
    /// Registered collateral by token address
    assets: Mapping<Address, CollateralAsset>,
    /// Registration order, used when valuing accounts
    asset_list: Var<Vec<Address>>,
    /// (user, token) -> deposited amount
    deposits: Mapping<(Address, Address), U256>,
    /// token -> sum of all deposits
    total_deposits: Mapping<Address, U256>,
    /// user -> minted debt
    debts: Mapping<Address, U256>,
    /// Sum of all user debt
    total_debt: Var<U256>,
}

#[odra::module]
impl CollateralLedger {
    // ========== Registry ==========

    /// Accept a new collateral type. Assets are never removed.
    pub fn register(&mut self, asset: CollateralAsset) {
        if self.assets.get(&asset.token).is_some() {
            self.env().revert(EngineError::CollateralAlreadyRegistered);
        }
        if asset.decimals > MAX_COLLATERAL_DECIMALS {
            self.env().revert(EngineError::InvalidDecimals);
        }

        self.assets.set(&asset.token, asset);
        let mut list = self.asset_list.get().unwrap_or_default();
        list.push(asset.token);
        self.asset_list.set(list);

        self.env().emit_event(CollateralRegistered {
            token: asset.token,
            price_feed: asset.price_feed,
            decimals: asset.decimals,
        });
    }

    /// Point a registered collateral at another feed
    pub fn repoint_feed(&mut self, token: Address, new_feed: Address) {
        let mut asset = self.require_asset(token);
        let previous_feed = asset.price_feed;
        asset.price_feed = new_feed;
        self.assets.set(&token, asset);

        self.env().emit_event(CollateralFeedUpdated {
            token,
            previous_feed,
            new_feed,
        });
    }

    pub fn asset(&self, token: Address) -> Option<CollateralAsset> {
        self.assets.get(&token)
    }

    /// Registered asset or `UnsupportedCollateral`
    pub fn require_asset(&self, token: Address) -> CollateralAsset {
        match self.assets.get(&token) {
            Some(asset) => asset,
            None => self.env().revert(EngineError::UnsupportedCollateral),
        }
    }

    /// Registered collateral tokens in registration order
    pub fn assets(&self) -> Vec<Address> {
        self.asset_list.get().unwrap_or_default()
    }

    pub fn asset_count(&self) -> u32 {
        self.assets().len() as u32
    }

    // ========== Positions ==========

    pub fn deposited(&self, user: Address, token: Address) -> U256 {
        self.deposits.get(&(user, token)).unwrap_or_default()
    }

    pub fn total_deposited(&self, token: Address) -> U256 {
        self.total_deposits.get(&token).unwrap_or_default()
    }

    pub fn debt(&self, user: Address) -> U256 {
        self.debts.get(&user).unwrap_or_default()
    }

    pub fn total_debt(&self) -> U256 {
        self.total_debt.get().unwrap_or_default()
    }

    pub fn credit_collateral(&mut self, user: Address, token: Address, amount: U256) {
        let env = self.env();
        let balance = or_revert(&env, checked_add(self.deposited(user, token), amount));
        let total = or_revert(&env, checked_add(self.total_deposited(token), amount));
        self.deposits.set(&(user, token), balance);
        self.total_deposits.set(&token, total);
    }

    /// Reverts with `InsufficientCollateral` rather than going negative
    pub fn debit_collateral(&mut self, user: Address, token: Address, amount: U256) {
        let env = self.env();
        let balance = or_revert(
            &env,
            checked_sub(self.deposited(user, token), amount, EngineError::InsufficientCollateral),
        );
        let total = or_revert(
            &env,
            checked_sub(self.total_deposited(token), amount, EngineError::InsufficientCollateral),
        );
        self.deposits.set(&(user, token), balance);
        self.total_deposits.set(&token, total);
    }

    pub fn increase_debt(&mut self, user: Address, amount: U256) {
        let env = self.env();
        let debt = or_revert(&env, checked_add(self.debt(user), amount));
        let total = or_revert(&env, checked_add(self.total_debt(), amount));
        self.debts.set(&user, debt);
        self.total_debt.set(total);
    }

    /// Reverts with `InsufficientDebt` when burning more than was minted
    pub fn decrease_debt(&mut self, user: Address, amount: U256) {
        let env = self.env();
        let debt = or_revert(&env, checked_sub(self.debt(user), amount, EngineError::InsufficientDebt));
        let total = or_revert(&env, checked_sub(self.total_debt(), amount, EngineError::InsufficientDebt));
        self.debts.set(&user, debt);
        self.total_debt.set(total);
    }
}
