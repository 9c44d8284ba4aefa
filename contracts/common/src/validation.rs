//! Validation Helpers for the Ballot Protocol
//!
//! Reusable precondition checks shared by the token, timelock and governor.
//! All of them run before any state is touched so a failing operation leaves
//! nothing behind.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ballot_common::check;
//!
//! check!(amount > 0, GovError::ZeroAmount);
//! require_controller(state.controller, ctx.caller)?;
//! ```

use crate::{
    errors::{GovError, GovResult},
    types::{is_zero_address, Address},
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// # Examples
///
/// ```rust,ignore
/// check!(amount > 0, GovError::ZeroAmount);
///
/// check!(
///     votes >= threshold,
///     GovError::ThresholdNotMet { votes, threshold }
/// );
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

// ============ Common Validation Helpers ============

/// Require an amount to be non-zero.
pub fn require_positive(amount: u64) -> GovResult<()> {
    if amount == 0 {
        return Err(GovError::ZeroAmount);
    }
    Ok(())
}

/// Require a value to be within a range (inclusive).
pub fn require_in_range(
    value: u64,
    min: u64,
    max: u64,
    param: &'static str,
) -> GovResult<()> {
    if value < min {
        return Err(GovError::InvalidParameter {
            param,
            reason: "below minimum",
        });
    }
    if value > max {
        return Err(GovError::InvalidParameter {
            param,
            reason: "above maximum",
        });
    }
    Ok(())
}

/// Require sufficient balance for an operation.
pub fn require_sufficient_balance(available: u64, requested: u64) -> GovResult<()> {
    if available < requested {
        return Err(GovError::InsufficientBalance {
            available,
            requested,
        });
    }
    Ok(())
}

/// Require the caller to be a specific principal.
pub fn require_caller(expected: Address, caller: Address) -> GovResult<()> {
    if expected != caller {
        return Err(GovError::Unauthorized {
            expected,
            actual: caller,
        });
    }
    Ok(())
}

/// Require address to not be zero.
pub fn require_valid_address(address: &Address, reason: &'static str) -> GovResult<()> {
    if is_zero_address(address) {
        return Err(GovError::InvalidAddress { reason });
    }
    Ok(())
}
