//! PUSD Synthetic Token Contract
//!
//! CEP-18 compatible stable token. Only authorized minters (the issuance
//! engine) can mint and burn. Holders can grant allowances off-band with a
//! signed, nonce-bound, deadline-bounded `permit`.

use odra::prelude::*;
use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::{Key, PublicKey, U256};
use crate::access_control::AccessControl;
use crate::errors::EngineError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const TOKEN_NAME: &str = "Peg USD";
const TOKEN_SYMBOL: &str = "PUSD";
const TOKEN_DECIMALS: u8 = 18;
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";
/// Domain tag prefixed to every permit payload
const PERMIT_DOMAIN: &[u8] = b"PUSD_PERMIT_V1";
const MILLIS_PER_SECOND: u64 = 1000;

#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Mint {
    pub minter: Address,
    pub to: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Burn {
    pub minter: Address,
    pub from: Address,
    pub amount: U256,
}

/// PUSD Synthetic Token Contract
#[odra::module(events = [Transfer, Approval, Mint, Burn])]
pub struct PegUsd {
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Permit nonces per owner
    nonces: Mapping<Address, u64>,
    /// Authorized minters (the issuance engine)
    authorized_minters: Mapping<Address, bool>,
    /// Admin policy
    access: SubModule<AccessControl>,
}

#[odra::module]
impl PegUsd {
    /// Initialize the token
    pub fn init(&mut self, admin: Address) {
        self.access.init(admin);
        self.total_supply.set(U256::zero());
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, TOKEN_DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        String::from(TOKEN_NAME)
    }

    pub fn symbol(&self) -> String {
        String::from(TOKEN_SYMBOL)
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
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

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(EngineError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Permit ==========

    /// Next permit nonce of `owner`
    pub fn nonce(&self, owner: Address) -> u64 {
        self.nonces.get(&owner).unwrap_or(0)
    }

    /// Exact payload `owner` must sign to authorize `permit`
    pub fn permit_message(&self, owner: Address, spender: Address, value: U256, deadline: u64) -> Bytes {
        let mut bytes = Vec::from(PERMIT_DOMAIN);
        bytes.extend_from_slice(&self.env().self_address().to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&owner.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&value.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&self.nonce(owner).to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&deadline.to_bytes().unwrap_or_default());
        Bytes::from(bytes)
    }

    /// Set `spender`'s allowance over `owner`'s tokens with `owner`'s signature.
    ///
    /// Consumes the owner's nonce, so each signature works once.
    pub fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        public_key: PublicKey,
        signature: Bytes,
    ) {
        let now = self.env().get_block_time() / MILLIS_PER_SECOND;
        if now > deadline {
            self.env().revert(EngineError::ExpiredOrInvalidAuthorization);
        }
        if Address::Account(public_key.to_account_hash()) != owner {
            self.env().revert(EngineError::ExpiredOrInvalidAuthorization);
        }

        let message = self.permit_message(owner, spender, value, deadline);
        if !self.env().verify_signature(&message, &signature, &public_key) {
            self.env().revert(EngineError::ExpiredOrInvalidAuthorization);
        }

        let next_nonce = self.nonce(owner) + 1;
        self.nonces.set(&owner, next_nonce);
        self.approve_internal(owner, spender, value);
    }

    // ========== Protocol Functions (Restricted) ==========

    /// Mint new tokens (only authorized minters)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_authorized_minter();

        let new_balance = match self.balance_of(to).checked_add(amount) {
            Some(b) => b,
            None => self.env().revert(EngineError::ArithmeticOverflow),
        };
        let new_supply = match self.total_supply().checked_add(amount) {
            Some(s) => s,
            None => self.env().revert(EngineError::ArithmeticOverflow),
        };

        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);

        self.env().emit_event(Mint {
            minter: self.env().caller(),
            to,
            amount,
        });
    }

    /// Destroy tokens held by `from` (only authorized minters)
    pub fn burn(&mut self, from: Address, amount: U256) {
        self.require_authorized_minter();

        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(EngineError::InsufficientBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);

        self.env().emit_event(Burn {
            minter: self.env().caller(),
            from,
            amount,
        });
    }

    // ========== Admin Functions ==========

    /// Add an authorized minter (admin only)
    pub fn add_minter(&mut self, minter: Address) {
        self.access.require_admin();
        self.authorized_minters.set(&minter, true);
    }

    /// Remove an authorized minter (admin only)
    pub fn remove_minter(&mut self, minter: Address) {
        self.access.require_admin();
        self.authorized_minters.set(&minter, false);
    }

    pub fn is_minter(&self, account: Address) -> bool {
        self.authorized_minters.get(&account).unwrap_or(false)
    }

    pub fn get_admin(&self) -> Option<Address> {
        self.access.admin()
    }

    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.access.transfer_admin(new_admin);
    }

    pub fn accept_admin(&mut self) {
        self.access.accept_admin();
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(EngineError::InsufficientBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);

        self.env().emit_event(Transfer { from, to, amount });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
        self.env().emit_event(Approval { owner, spender, amount });
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = Self::cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let key = Key::from(owner);
        let bytes = key.to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let owner_key = Key::from(owner);
        let spender_key = Key::from(spender);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&owner_key.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender_key.to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }

    fn require_authorized_minter(&self) {
        if !self.is_minter(self.env().caller()) {
            self.env().revert(EngineError::Unauthorized);
        }
    }
}
