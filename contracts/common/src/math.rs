//! Mathematical Utilities for the Ballot Protocol
//!
//! Checked arithmetic that maps failures onto protocol errors.

use crate::constants::precision::PERCENT_DENOMINATOR;
use crate::errors::{GovError, GovResult};

/// `a + b`, failing with `Overflow`
pub fn add(a: u64, b: u64) -> GovResult<u64> {
    a.checked_add(b).ok_or(GovError::Overflow)
}

/// `a - b`, failing with `Underflow`
pub fn sub(a: u64, b: u64) -> GovResult<u64> {
    a.checked_sub(b).ok_or(GovError::Underflow)
}

/// `value * percent / 100`, computed in u128
///
/// # Arguments
/// * `value` - Base quantity (e.g., total supply)
/// * `percent` - Percentage in whole points (0-100)
pub fn percent_of(value: u64, percent: u8) -> u64 {
    let scaled = value as u128 * percent as u128 / PERCENT_DENOMINATOR as u128;
    // percent above 100 can exceed u64
    scaled.min(u64::MAX as u128) as u64
}

/// Sum of two vote tallies, without overflow
pub fn total_votes(for_votes: u64, against_votes: u64) -> u128 {
    for_votes as u128 + against_votes as u128
}
