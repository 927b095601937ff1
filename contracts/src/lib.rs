//! Peg Engine Contracts
//!
//! Over-collateralized issuance of a USD-pegged synthetic token on Casper.
//!
//! ## Architecture
//!
//! - **IssuanceEngine**: Collateral custody, debt accounting, mint/burn and
//!   reward emissions behind a 200% minimum health factor
//! - **PriceOracle**: Aggregator feed reads with per-feed staleness windows
//! - **CollateralLedger**: Accepted collateral and per-user positions
//! - **Stablecoin (PUSD)**: CEP-18 synthetic token with minter control and permits
//! - **AccessControl / Guards**: Admin policy, pause switch and reentrancy lock
//!
//! ## Fail-closed pricing
//!
//! Any price read the oracle cannot vouch for (no configured window, stale or
//! incomplete round, zero answer) aborts the operation that needed it. There
//! is no cached fallback price.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod math;
pub mod interfaces;

// Engine building blocks
pub mod access_control;
pub mod guards;
pub mod price_oracle;
pub mod ledger;

// Contract modules
pub mod engine;
pub mod stablecoin;

// Test doubles for feeds and collateral tokens
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
