//! Core Types for the Ballot Protocol
//!
//! Identities, digests, and the per-call context shared by all contracts.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for account addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for SHA-256 digests
pub type Hash = [u8; 32];

/// Type alias for queued transaction digests
pub type TxDigest = [u8; 32];

/// The zero address, meaning "no account"
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Returns true for the zero address
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Caller and block of the transaction currently executing
///
/// Supplied by the host for every operation so all contracts read the
/// same block counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account invoking the operation
    pub caller: Address,
    /// Current block height
    pub block_height: u64,
}

impl CallContext {
    /// Creates a context for `caller` at `block_height`
    pub fn new(caller: Address, block_height: u64) -> Self {
        Self { caller, block_height }
    }

    /// Same block, different caller (a contract calling another contract)
    pub fn as_caller(&self, caller: Address) -> Self {
        Self {
            caller,
            block_height: self.block_height,
        }
    }
}

/// Detached signature bytes, opaque to the protocol
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    /// Wraps raw signature bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Ballot choice. Only for/against are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Support {
    /// Vote against the proposal
    Against,
    /// Vote for the proposal
    For,
}

impl Support {
    /// Encoding used inside signed ballots
    pub fn as_bool(&self) -> bool {
        matches!(self, Support::For)
    }

    /// Inverse of [`Support::as_bool`]
    pub fn from_bool(support: bool) -> Self {
        if support {
            Support::For
        } else {
            Support::Against
        }
    }
}
