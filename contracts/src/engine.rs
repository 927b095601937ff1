//! Issuance Engine
//!
//! Holds collateral, tracks debt and mints/burns the synthetic token. Every
//! user operation that can lower a health factor re-checks it against
//! `MIN_HEALTH_FACTOR` before any token leaves the engine; a failed check
//! reverts the whole call, nested token calls included.
//!
//! Mutating entry points share one shape:
//! 1. reject when paused, take the reentrancy lock
//! 2. validate input and update the ledger
//! 3. check solvency of the acting account
//! 4. call the token contracts
//! 5. emit an event and release the lock
//!
//! Composite entry points (`deposit_collateral_and_mint_debt`,
//! `redeem_collateral_for_debt`, `execute_batch`) run the same internal steps
//! inside a single call, so they are all-or-nothing.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::account::AccountHash;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{PublicKey, U256};
use crate::access_control::AccessControl;
use crate::errors::{or_revert, EngineError};
use crate::guards::{PauseGuard, ReentrancyGuard};
use crate::interfaces::{Cep18TokenContractRef, SyntheticTokenContractRef};
use crate::ledger::CollateralLedger;
use crate::math::{self, MIN_HEALTH_FACTOR};
use crate::price_oracle::PriceOracle;
use crate::types::{
    AccountInformation, CollateralAsset, EngineCall, EngineCallKind, RewardMinters, SystemTotals,
};

/// Collateral moved into the engine
#[odra::event]
pub struct CollateralDeposited {
    pub user: Address,
    pub token: Address,
    pub amount: U256,
}

/// Collateral released from a position
#[odra::event]
pub struct CollateralRedeemed {
    pub from: Address,
    pub to: Address,
    pub token: Address,
    pub amount: U256,
}

/// Debt opened and synthetic tokens minted
#[odra::event]
pub struct DebtMinted {
    pub user: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// Debt repaid and synthetic tokens destroyed
#[odra::event]
pub struct DebtBurned {
    pub payer: Address,
    pub on_behalf_of: Address,
    pub amount: U256,
}

/// Incentive emission minted outside the debt ledger
#[odra::event]
pub struct RewardMinted {
    pub minter: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// Reward collaborators recorded
#[odra::event]
pub struct RewardMintersConfigured {
    pub airdrop: Address,
    pub staking_pool: Address,
}

/// Over-collateralized issuance engine
#[odra::module(events = [
    CollateralDeposited,
    CollateralRedeemed,
    DebtMinted,
    DebtBurned,
    RewardMinted,
    RewardMintersConfigured
])]
pub struct IssuanceEngine {
    /// Admin policy
    access: SubModule<AccessControl>,
    /// Validated price reads and staleness windows
    oracle: SubModule<PriceOracle>,
    /// Collateral registry and user positions
    ledger: SubModule<CollateralLedger>,
    /// Emergency stop
    pause_guard: SubModule<PauseGuard>,
    /// Call-scope lock
    reentrancy: SubModule<ReentrancyGuard>,
    /// Synthetic token contract (engine holds mint/burn authority)
    synthetic_token: Var<Address>,
    /// Collaborators allowed to mint rewards, set once
    reward_minters: Var<Option<RewardMinters>>,
}

#[odra::module]
impl IssuanceEngine {
    /// Initialize the engine with its admin, token and initial collateral set
    pub fn init(&mut self, admin: Address, synthetic_token: Address, collateral: Vec<CollateralAsset>) {
        self.require_non_zero(admin);
        self.require_non_zero(synthetic_token);

        self.access.init(admin);
        self.synthetic_token.set(synthetic_token);
        self.reward_minters.set(None);

        for asset in collateral {
            self.register_asset(asset);
        }
    }

    // ========== Collateral ==========

    /// Move `amount` of `token` from the caller into the engine
    pub fn deposit_collateral(&mut self, token: Address, amount: U256) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.deposit_internal(caller, token, amount);
        self.end_mutation();
    }

    /// Release the caller's collateral to `to`; the caller must stay healthy
    pub fn redeem_collateral(&mut self, token: Address, amount: U256, to: Address) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.redeem_internal(caller, to, token, amount);
        self.end_mutation();
    }

    // ========== Debt ==========

    /// Open `amount` of debt for the caller and mint it to `mint_to`
    pub fn mint_debt(&mut self, amount: U256, mint_to: Address) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.mint_internal(caller, amount, mint_to);
        self.end_mutation();
    }

    /// Repay `on_behalf_of`'s debt by burning the caller's tokens directly
    pub fn burn_debt(&mut self, amount: U256, on_behalf_of: Address) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.burn_direct(caller, on_behalf_of, amount);
        self.end_mutation();
    }

    /// Repay `on_behalf_of`'s debt with tokens the caller approved to the engine
    pub fn burn_debt_from_allowance(&mut self, amount: U256, on_behalf_of: Address) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.settle_debt(caller, on_behalf_of, amount);

        let engine = self.env().self_address();
        let mut token = self.synthetic_token_ref();
        token.transfer_from(caller, engine, amount);
        token.burn(engine, amount);
        self.end_mutation();
    }

    /// Repay the key holder's own debt with a signed permit naming the engine
    /// as spender. Anyone may relay it, but the permit does not cover a
    /// beneficiary, so `on_behalf_of` must be the signer.
    pub fn burn_debt_with_permit(
        &mut self,
        amount: U256,
        on_behalf_of: Address,
        deadline: u64,
        owner_key: PublicKey,
        signature: Bytes,
    ) {
        self.begin_mutation();
        let owner = Address::Account(owner_key.to_account_hash());
        if on_behalf_of != owner {
            self.env().revert(EngineError::ExpiredOrInvalidAuthorization);
        }
        self.settle_debt(owner, on_behalf_of, amount);

        let engine = self.env().self_address();
        let mut token = self.synthetic_token_ref();
        token.permit(owner, engine, amount, deadline, owner_key, signature);
        token.transfer_from(owner, engine, amount);
        token.burn(engine, amount);
        self.end_mutation();
    }

    // ========== Composite ==========

    /// Deposit collateral and mint debt to the caller in one call
    pub fn deposit_collateral_and_mint_debt(
        &mut self,
        token: Address,
        collateral_amount: U256,
        debt_amount: U256,
    ) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.deposit_internal(caller, token, collateral_amount);
        self.mint_internal(caller, debt_amount, caller);
        self.end_mutation();
    }

    /// Burn the caller's debt, then redeem collateral back to the caller.
    /// Solvency is checked after both steps.
    pub fn redeem_collateral_for_debt(
        &mut self,
        token: Address,
        collateral_amount: U256,
        debt_amount: U256,
    ) {
        self.begin_mutation();
        let caller = self.env().caller();
        self.burn_direct(caller, caller, debt_amount);
        self.redeem_internal(caller, caller, token, collateral_amount);
        self.end_mutation();
    }

    /// Run `calls` in order on behalf of the caller. Each step is checked
    /// exactly like the standalone entry point; the first failure reverts
    /// every step.
    pub fn execute_batch(&mut self, calls: Vec<EngineCall>) {
        self.begin_mutation();
        if calls.is_empty() {
            self.env().revert(EngineError::EmptyBatch);
        }
        let caller = self.env().caller();
        for call in calls {
            let recipient = call.recipient.unwrap_or(caller);
            match call.kind {
                EngineCallKind::DepositCollateral => {
                    let token = self.batch_token(&call);
                    self.deposit_internal(caller, token, call.amount);
                }
                EngineCallKind::MintDebt => self.mint_internal(caller, call.amount, recipient),
                EngineCallKind::BurnDebt => self.burn_direct(caller, recipient, call.amount),
                EngineCallKind::RedeemCollateral => {
                    let token = self.batch_token(&call);
                    self.redeem_internal(caller, recipient, token, call.amount);
                }
            }
        }
        self.end_mutation();
    }

    // ========== Reward Minting ==========

    /// Record the airdrop and staking pool collaborators (admin only, once)
    pub fn set_reward_minters(&mut self, airdrop: Address, staking_pool: Address) {
        self.access.require_admin();
        if self.get_reward_minters().is_some() {
            self.env().revert(EngineError::AlreadyConfigured);
        }
        self.require_non_zero(airdrop);
        self.require_non_zero(staking_pool);

        self.reward_minters.set(Some(RewardMinters { airdrop, staking_pool }));
        self.env().emit_event(RewardMintersConfigured { airdrop, staking_pool });
    }

    /// Mint airdrop rewards (airdrop collaborator only)
    pub fn mint_for_airdrop(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        let allowed = self.get_reward_minters().map(|m| m.airdrop);
        self.reward_mint(caller, allowed, to, amount);
    }

    /// Mint staking rewards (staking pool collaborator only)
    pub fn mint_for_pool(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        let allowed = self.get_reward_minters().map(|m| m.staking_pool);
        self.reward_mint(caller, allowed, to, amount);
    }

    // ========== Admin ==========

    /// Accept a new collateral type (admin only)
    pub fn register_collateral(&mut self, token: Address, price_feed: Address, decimals: u8) {
        self.access.require_admin();
        self.register_asset(CollateralAsset { token, price_feed, decimals });
    }

    /// Point a collateral at another price feed (admin only)
    pub fn update_collateral_feed(&mut self, token: Address, price_feed: Address) {
        self.access.require_admin();
        self.require_non_zero(price_feed);
        self.ledger.repoint_feed(token, price_feed);
    }

    /// Set the staleness window of a feed in seconds; zero disables the feed
    pub fn set_feed_timeout(&mut self, feed: Address, timeout_seconds: u64) {
        self.access.require_admin();
        self.oracle.set_timeout(feed, timeout_seconds);
    }

    pub fn pause(&mut self) {
        self.access.require_admin();
        self.pause_guard.pause();
    }

    pub fn unpause(&mut self) {
        self.access.require_admin();
        self.pause_guard.unpause();
    }

    /// Nominate a new admin (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_non_zero(new_admin);
        self.access.transfer_admin(new_admin);
    }

    /// Complete an admin handover (nominee only)
    pub fn accept_admin(&mut self) {
        self.access.accept_admin();
    }

    // ========== Views ==========

    /// Health factor of `user` (1e17 = 100%); `U256::MAX` without debt
    pub fn get_health_factor(&self, user: Address) -> U256 {
        let debt = self.ledger.debt(user);
        if debt.is_zero() {
            return U256::MAX;
        }
        let collateral_value = self.get_account_collateral_value_usd(user);
        self.calculate_health_factor(collateral_value, debt)
    }

    /// Health factor for arbitrary figures
    pub fn calculate_health_factor(&self, collateral_value_usd: U256, total_debt: U256) -> U256 {
        or_revert(&self.env(), math::health_factor(collateral_value_usd, total_debt))
    }

    /// USD value (18 decimals) of everything `user` deposited
    pub fn get_account_collateral_value_usd(&self, user: Address) -> U256 {
        let env = self.env();
        let mut total = U256::zero();
        for token in self.ledger.assets() {
            let amount = self.ledger.deposited(user, token);
            if amount.is_zero() {
                continue;
            }
            let value = self.get_usd_value(token, amount);
            total = or_revert(&env, math::checked_add(total, value));
        }
        total
    }

    /// USD value (18 decimals) of `amount` base units of `token`
    pub fn get_usd_value(&self, token: Address, amount: U256) -> U256 {
        let asset = self.ledger.require_asset(token);
        let price = self.oracle.price(asset.price_feed);
        or_revert(&self.env(), math::usd_value(price, amount, asset.decimals))
    }

    /// Base units of `token` worth `usd_amount` (18 decimals), rounded down
    pub fn get_asset_amount_from_usd(&self, token: Address, usd_amount: U256) -> U256 {
        let asset = self.ledger.require_asset(token);
        let price = self.oracle.price(asset.price_feed);
        or_revert(&self.env(), math::token_amount_from_usd(usd_amount, asset.decimals, price))
    }

    pub fn get_account_information(&self, user: Address) -> AccountInformation {
        AccountInformation {
            total_debt: self.ledger.debt(user),
            collateral_value_usd: self.get_account_collateral_value_usd(user),
        }
    }

    pub fn get_collateral_balance(&self, user: Address, token: Address) -> U256 {
        self.ledger.deposited(user, token)
    }

    /// Sum of all deposits of `token`
    pub fn get_total_collateral(&self, token: Address) -> U256 {
        self.ledger.total_deposited(token)
    }

    pub fn get_debt(&self, user: Address) -> U256 {
        self.ledger.debt(user)
    }

    pub fn get_collateral_assets(&self) -> Vec<Address> {
        self.ledger.assets()
    }

    pub fn get_collateral_asset(&self, token: Address) -> Option<CollateralAsset> {
        self.ledger.asset(token)
    }

    pub fn get_synthetic_token(&self) -> Option<Address> {
        self.synthetic_token.get()
    }

    pub fn get_min_health_factor(&self) -> U256 {
        U256::from(MIN_HEALTH_FACTOR)
    }

    pub fn get_feed_timeout(&self, feed: Address) -> Option<u64> {
        self.oracle.timeout(feed)
    }

    pub fn is_paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    pub fn get_reward_minters(&self) -> Option<RewardMinters> {
        self.reward_minters.get().flatten()
    }

    pub fn get_admin(&self) -> Option<Address> {
        self.access.admin()
    }

    pub fn get_pending_admin(&self) -> Option<Address> {
        self.access.pending_admin()
    }

    pub fn get_system_totals(&self) -> SystemTotals {
        SystemTotals {
            total_debt: self.ledger.total_debt(),
            collateral_count: self.ledger.asset_count(),
        }
    }
}

impl IssuanceEngine {
    fn begin_mutation(&mut self) {
        self.pause_guard.require_not_paused();
        self.reentrancy.enter();
    }

    fn end_mutation(&mut self) {
        self.reentrancy.exit();
    }

    fn deposit_internal(&mut self, user: Address, token: Address, amount: U256) {
        self.require_positive(amount);
        self.ledger.require_asset(token);
        self.ledger.credit_collateral(user, token, amount);

        let engine = self.env().self_address();
        if !Cep18TokenContractRef::new(self.env(), token).transfer_from(user, engine, amount) {
            self.env().revert(EngineError::TransferFailed);
        }

        self.env().emit_event(CollateralDeposited { user, token, amount });
    }

    fn redeem_internal(&mut self, from: Address, to: Address, token: Address, amount: U256) {
        self.require_positive(amount);
        self.require_non_zero(to);
        self.ledger.require_asset(token);
        self.ledger.debit_collateral(from, token, amount);
        self.require_healthy(from);

        if !Cep18TokenContractRef::new(self.env(), token).transfer(to, amount) {
            self.env().revert(EngineError::TransferFailed);
        }

        self.env().emit_event(CollateralRedeemed { from, to, token, amount });
    }

    fn mint_internal(&mut self, user: Address, amount: U256, mint_to: Address) {
        self.require_positive(amount);
        self.require_non_zero(mint_to);
        self.ledger.increase_debt(user, amount);
        self.require_healthy(user);

        self.synthetic_token_ref().mint(mint_to, amount);

        self.env().emit_event(DebtMinted { user, recipient: mint_to, amount });
    }

    /// Burn straight from `payer`'s balance via the engine's burn authority
    fn burn_direct(&mut self, payer: Address, on_behalf_of: Address, amount: U256) {
        self.settle_debt(payer, on_behalf_of, amount);
        self.synthetic_token_ref().burn(payer, amount);
    }

    /// Ledger side of every burn variant. Repaying only raises the health
    /// factor, so no solvency check follows.
    fn settle_debt(&mut self, payer: Address, on_behalf_of: Address, amount: U256) {
        self.require_positive(amount);
        self.require_non_zero(on_behalf_of);
        self.ledger.decrease_debt(on_behalf_of, amount);
        self.env().emit_event(DebtBurned { payer, on_behalf_of, amount });
    }

    fn reward_mint(&mut self, caller: Address, allowed: Option<Address>, to: Address, amount: U256) {
        if allowed != Some(caller) {
            self.env().revert(EngineError::Unauthorized);
        }
        self.begin_mutation();
        self.require_positive(amount);
        self.require_non_zero(to);

        self.synthetic_token_ref().mint(to, amount);

        self.env().emit_event(RewardMinted { minter: caller, recipient: to, amount });
        self.end_mutation();
    }

    fn register_asset(&mut self, asset: CollateralAsset) {
        self.require_non_zero(asset.token);
        self.require_non_zero(asset.price_feed);
        self.ledger.register(asset);
    }

    fn require_healthy(&self, user: Address) {
        if !math::is_healthy(self.get_health_factor(user)) {
            self.env().revert(EngineError::HealthFactorBroken);
        }
    }

    fn require_positive(&self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(EngineError::ZeroAmount);
        }
    }

    fn require_non_zero(&self, address: Address) {
        if address == zero_address() {
            self.env().revert(EngineError::ZeroAddress);
        }
    }

    fn batch_token(&self, call: &EngineCall) -> Address {
        match call.token {
            Some(token) => token,
            None => self.env().revert(EngineError::UnsupportedCollateral),
        }
    }

    fn synthetic_token_ref(&self) -> SyntheticTokenContractRef {
        match self.synthetic_token.get() {
            Some(token) => SyntheticTokenContractRef::new(self.env(), token),
            None => self.env().revert(EngineError::ZeroAddress),
        }
    }
}

/// Account address with an all-zero hash, never a valid target
pub fn zero_address() -> Address {
    Address::Account(AccountHash::new([0u8; 32]))
}
