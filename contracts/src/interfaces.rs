//! Cross-contract interfaces consumed by the engine.

use odra::prelude::*;
use odra::casper_types::{bytesrepr::Bytes, PublicKey, U256};
use crate::types::RoundData;

/// Aggregator-style USD price feed
#[odra::external_contract]
pub trait PriceFeed {
    fn latest_round_data(&self) -> RoundData;
    fn decimals(&self) -> u8;
}

/// CEP-18 token interface used for collateral custody
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn balance_of(&self, account: Address) -> U256;
    fn decimals(&self) -> u8;
}

/// Synthetic token ledger with mint/burn authority
#[odra::external_contract]
pub trait SyntheticToken {
    fn mint(&mut self, to: Address, amount: U256);
    fn burn(&mut self, from: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        public_key: PublicKey,
        signature: Bytes,
    );
    fn balance_of(&self, account: Address) -> U256;
}
