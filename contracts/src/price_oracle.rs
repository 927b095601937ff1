//! Price Oracle
//!
//! Reads USD prices from aggregator-style feeds and refuses anything it
//! cannot vouch for:
//! - feeds without a configured staleness window
//! - incomplete or inconsistent rounds
//! - answers older than the window (`now - updated_at > timeout`)
//! - zero answers
//!
//! There is no fallback price and no retry. A rejected read aborts the
//! calling operation.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::U256;
use crate::errors::{or_revert, EngineError};
use crate::interfaces::PriceFeedContractRef;
use crate::types::RoundData;

/// Casper block time is reported in milliseconds
const MILLIS_PER_SECOND: u64 = 1000;

/// Staleness window changed; `timeout_seconds == 0` means cleared
#[odra::event]
pub struct FeedTimeoutSet {
    pub feed: Address,
    pub timeout_seconds: u64,
}

/// Per-feed staleness configuration and validated reads
#[odra::module(events = [FeedTimeoutSet])]
pub struct PriceOracle {
    /// Maximum accepted answer age per feed, in seconds
    timeouts: Mapping<Address, u64>,
}

#[odra::module]
impl PriceOracle {
    /// Validated price with 8 fractional digits; reverts on any unsafe read
    pub fn price(&self, feed: Address) -> U256 {
        let timeout = match self.timeout(feed) {
            Some(t) => t,
            None => self.env().revert(EngineError::StaleData),
        };
        let round = PriceFeedContractRef::new(self.env(), feed).latest_round_data();
        or_revert(&self.env(), validate_round(&round, self.now_seconds(), timeout))
    }

    /// Overwrite the staleness window of a feed; zero clears it
    pub fn set_timeout(&mut self, feed: Address, timeout_seconds: u64) {
        self.timeouts.set(&feed, timeout_seconds);
        self.env().emit_event(FeedTimeoutSet { feed, timeout_seconds });
    }

    /// Configured window, `None` when unset or cleared
    pub fn timeout(&self, feed: Address) -> Option<u64> {
        self.timeouts.get(&feed).filter(|t| *t > 0)
    }

    fn now_seconds(&self) -> u64 {
        self.env().get_block_time() / MILLIS_PER_SECOND
    }
}

/// Check one round against the staleness window.
///
/// An answer exactly `timeout` seconds old is still fresh. A timestamp ahead
/// of the block clock counts as age zero.
pub fn validate_round(round: &RoundData, now: u64, timeout: u64) -> Result<U256, EngineError> {
    if round.updated_at == 0 || round.answered_in_round < round.round_id {
        return Err(EngineError::StaleData);
    }
    if now.saturating_sub(round.updated_at) > timeout {
        return Err(EngineError::StaleData);
    }
    if round.answer.is_zero() {
        return Err(EngineError::OracleReadFailure);
    }
    Ok(round.answer)
}
