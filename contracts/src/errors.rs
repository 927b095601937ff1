//! Protocol error definitions.

use odra::prelude::*;

/// Coarse failure category reported to callers.
///
/// Lets a client tell "fix your input" apart from "system temporarily unsafe"
/// and "not allowed" without matching every variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientBalance,
    HealthFactorBroken,
    StaleData,
    Unauthorized,
    ExpiredOrInvalidAuthorization,
    SystemPaused,
    AlreadyConfigured,
    Reentrancy,
    Arithmetic,
}

/// Issuance engine errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EngineError {
    // Input errors (1xx)
    ZeroAmount = 100,
    UnsupportedCollateral = 101,
    ZeroAddress = 102,
    CollateralAlreadyRegistered = 103,
    InvalidDecimals = 104,
    EmptyBatch = 105,

    // Balance errors (2xx)
    InsufficientCollateral = 200,
    InsufficientDebt = 201,
    InsufficientBalance = 202,
    InsufficientAllowance = 203,
    TransferFailed = 204,

    // Solvency errors (3xx)
    HealthFactorBroken = 300,

    // Oracle errors (4xx)
    StaleData = 400,
    OracleReadFailure = 401,

    // Access control errors (5xx)
    Unauthorized = 500,
    NoPendingAdmin = 501,
    ExpiredOrInvalidAuthorization = 502,

    // Lifecycle errors (6xx)
    SystemPaused = 600,
    AlreadyConfigured = 601,
    ReentrantCall = 602,

    // Math errors (7xx)
    ArithmeticOverflow = 700,
    DivisionByZero = 701,
}

impl EngineError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Input
            EngineError::ZeroAmount => "Amount must be greater than zero",
            EngineError::UnsupportedCollateral => "Collateral not supported",
            EngineError::ZeroAddress => "Zero address not allowed",
            EngineError::CollateralAlreadyRegistered => "Collateral already registered",
            EngineError::InvalidDecimals => "Collateral decimals out of range",
            EngineError::EmptyBatch => "Batch contains no calls",

            // Balance
            EngineError::InsufficientCollateral => "Insufficient deposited collateral",
            EngineError::InsufficientDebt => "Burn amount exceeds minted debt",
            EngineError::InsufficientBalance => "Insufficient token balance",
            EngineError::InsufficientAllowance => "Insufficient token allowance",
            EngineError::TransferFailed => "Collateral token transfer failed",

            // Solvency
            EngineError::HealthFactorBroken => "Health factor below minimum",

            // Oracle
            EngineError::StaleData => "Oracle price stale or unsafe",
            EngineError::OracleReadFailure => "Oracle returned an invalid price",

            // Access control
            EngineError::Unauthorized => "Unauthorized caller",
            EngineError::NoPendingAdmin => "No pending admin transfer for caller",
            EngineError::ExpiredOrInvalidAuthorization => "Authorization expired or invalid",

            // Lifecycle
            EngineError::SystemPaused => "Operation blocked: system paused",
            EngineError::AlreadyConfigured => "Already configured",
            EngineError::ReentrantCall => "Reentrant call rejected",

            // Math
            EngineError::ArithmeticOverflow => "Arithmetic overflow",
            EngineError::DivisionByZero => "Division by zero",
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ZeroAmount
            | EngineError::UnsupportedCollateral
            | EngineError::ZeroAddress
            | EngineError::CollateralAlreadyRegistered
            | EngineError::InvalidDecimals
            | EngineError::EmptyBatch => ErrorKind::InvalidInput,
            EngineError::InsufficientCollateral
            | EngineError::InsufficientDebt
            | EngineError::InsufficientBalance
            | EngineError::InsufficientAllowance
            | EngineError::TransferFailed => ErrorKind::InsufficientBalance,
            EngineError::HealthFactorBroken => ErrorKind::HealthFactorBroken,
            EngineError::StaleData | EngineError::OracleReadFailure => ErrorKind::StaleData,
            EngineError::Unauthorized | EngineError::NoPendingAdmin => ErrorKind::Unauthorized,
            EngineError::ExpiredOrInvalidAuthorization => ErrorKind::ExpiredOrInvalidAuthorization,
            EngineError::SystemPaused => ErrorKind::SystemPaused,
            EngineError::AlreadyConfigured => ErrorKind::AlreadyConfigured,
            EngineError::ReentrantCall => ErrorKind::Reentrancy,
            EngineError::ArithmeticOverflow | EngineError::DivisionByZero => ErrorKind::Arithmetic,
        }
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<EngineError> for OdraError {
    fn from(error: EngineError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

/// Unwrap a fallible helper result, reverting the call with its error.
pub fn or_revert<T>(env: &odra::ContractEnv, result: Result<T, EngineError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => env.revert(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_grouped_by_category() {
        assert_eq!(EngineError::ZeroAmount as u16, 100);
        assert_eq!(EngineError::HealthFactorBroken as u16, 300);
        assert_eq!(EngineError::StaleData as u16, 400);
        assert_eq!(EngineError::SystemPaused as u16, 600);
        assert_eq!(EngineError::DivisionByZero as u16, 701);
    }

    #[test]
    fn test_kind_separates_input_from_unsafe_from_forbidden() {
        assert_eq!(EngineError::UnsupportedCollateral.kind(), ErrorKind::InvalidInput);
        assert_eq!(EngineError::OracleReadFailure.kind(), ErrorKind::StaleData);
        assert_eq!(EngineError::NoPendingAdmin.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_display_uses_message() {
        assert_eq!(EngineError::StaleData.to_string(), "Oracle price stale or unsafe");
    }
}
