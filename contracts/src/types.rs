//! Common types used across the issuance engine.

use odra::prelude::*;
use odra::casper_types::U256;

/// Accepted collateral type
#[odra::odra_type]
#[derive(Copy)]
pub struct CollateralAsset {
    /// CEP-18 token contract of the collateral
    pub token: Address,
    /// Price feed reporting USD per whole token with 8 decimals
    pub price_feed: Address,
    /// Decimal precision of the collateral token
    pub decimals: u8,
}

/// Round data reported by an aggregator-style price feed
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct RoundData {
    /// Round identifier
    pub round_id: u64,
    /// USD price with 8 fractional digits
    pub answer: U256,
    /// Round start timestamp in seconds
    pub started_at: u64,
    /// Last update timestamp in seconds (0 = round incomplete)
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

/// Collaborators allowed to mint incentive emissions
#[odra::odra_type]
#[derive(Copy)]
pub struct RewardMinters {
    /// Airdrop lottery contract
    pub airdrop: Address,
    /// Staking pool contract
    pub staking_pool: Address,
}

/// Debt and collateral value of one account
#[odra::odra_type]
#[derive(Copy)]
pub struct AccountInformation {
    /// Minted synthetic tokens owed by the account
    pub total_debt: U256,
    /// USD value (18 decimals) of all deposited collateral
    pub collateral_value_usd: U256,
}

/// System-wide ledger totals
#[odra::odra_type]
#[derive(Default)]
pub struct SystemTotals {
    /// Sum of all user debt
    pub total_debt: U256,
    /// Number of registered collateral assets
    pub collateral_count: u32,
}

/// Operation selector for batched engine calls
#[odra::odra_type]
#[derive(Copy)]
pub enum EngineCallKind {
    DepositCollateral,
    MintDebt,
    BurnDebt,
    RedeemCollateral,
}

/// One step of an `execute_batch` call.
///
/// `token` is required for collateral operations, `recipient` names the mint
/// target, the burn beneficiary, or the redemption receiver and defaults to
/// the caller.
#[odra::odra_type]
pub struct EngineCall {
    pub kind: EngineCallKind,
    pub token: Option<Address>,
    pub amount: U256,
    pub recipient: Option<Address>,
}

impl EngineCall {
    pub fn deposit(token: Address, amount: U256) -> Self {
        Self { kind: EngineCallKind::DepositCollateral, token: Some(token), amount, recipient: None }
    }

    pub fn mint(amount: U256, mint_to: Address) -> Self {
        Self { kind: EngineCallKind::MintDebt, token: None, amount, recipient: Some(mint_to) }
    }

    pub fn burn(amount: U256, on_behalf_of: Address) -> Self {
        Self { kind: EngineCallKind::BurnDebt, token: None, amount, recipient: Some(on_behalf_of) }
    }

    pub fn redeem(token: Address, amount: U256, to: Address) -> Self {
        Self { kind: EngineCallKind::RedeemCollateral, token: Some(token), amount, recipient: Some(to) }
    }
}
