//! Checkpoint Ledger
//!
//! Append-only voting power history. Each account owns a sequence of
//! `(from_block, votes)` checkpoints with strictly increasing blocks; the
//! value of a checkpoint holds from its block (inclusive) until the next
//! checkpoint's block (exclusive). A parallel sequence tracks total supply.
//!
//! ## Rules
//!
//! - Writes at the block of the last checkpoint overwrite it, so several
//!   updates inside one block leave a single checkpoint
//! - Writes never go backward in time
//! - Historical queries only answer for blocks strictly before the current
//!   one; the current block's value can still change and is never reported

use crate::errors::{GovError, GovResult};
use crate::types::Address;
use crate::{BTreeMap, Vec};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Read access to historical voting power
///
/// Implemented by the voting token; the governor only ever reads through
/// this trait.
pub trait VotingPowerSource {
    /// Votes delegated to `account` as of `block` (which must be before `current_block`)
    fn prior_votes(&self, account: &Address, block: u64, current_block: u64) -> GovResult<u64>;

    /// Total supply as of `block` (which must be before `current_block`)
    fn prior_total_supply(&self, block: u64, current_block: u64) -> GovResult<u64>;
}

/// A single historical value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Checkpoint {
    /// Block from which `votes` is valid
    pub from_block: u64,
    /// Value valid from `from_block`
    pub votes: u64,
}

/// Ordered checkpoints for one account (or for total supply)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CheckpointHistory {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checkpoints
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Returns true if nothing was ever written
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Checkpoint at `index`
    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }

    /// All checkpoints, oldest first
    pub fn as_slice(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Value of the last checkpoint, or 0
    pub fn latest(&self) -> u64 {
        self.checkpoints.last().map(|c| c.votes).unwrap_or(0)
    }

    /// Fails if a write at `block` would move the history backward
    pub fn ensure_writable(&self, block: u64) -> GovResult<()> {
        match self.checkpoints.last() {
            Some(last) if block < last.from_block => Err(GovError::InvariantViolation {
                reason: "checkpoint block moved backward",
            }),
            _ => Ok(()),
        }
    }

    /// Record `value` as valid from `block`
    pub fn write(&mut self, value: u64, block: u64) -> GovResult<()> {
        match self.checkpoints.last_mut() {
            Some(last) if last.from_block == block => {
                last.votes = value;
            }
            Some(last) if block < last.from_block => {
                return Err(GovError::InvariantViolation {
                    reason: "checkpoint block moved backward",
                });
            }
            _ => self.checkpoints.push(Checkpoint {
                from_block: block,
                votes: value,
            }),
        }
        Ok(())
    }

    /// Value as of `block`; rejects the current block and the future
    pub fn value_at(&self, block: u64, current_block: u64) -> GovResult<u64> {
        if block >= current_block {
            return Err(GovError::BlockNotYetMined {
                block,
                current_block,
            });
        }
        Ok(self.lookup(block))
    }

    /// Binary search for the greatest checkpoint block <= `block`
    fn lookup(&self, block: u64) -> u64 {
        // Most lookups target recent blocks
        match self.checkpoints.last() {
            None => return 0,
            Some(last) if last.from_block <= block => return last.votes,
            _ => {}
        }

        let upper = self.checkpoints.partition_point(|c| c.from_block <= block);
        if upper == 0 {
            0
        } else {
            self.checkpoints[upper - 1].votes
        }
    }
}

/// Per-account voting power histories plus the total supply history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CheckpointLedger {
    accounts: BTreeMap<Address, CheckpointHistory>,
    total_supply: CheckpointHistory,
}

impl CheckpointLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `account`'s voting power as `value` from `block`
    pub fn write(&mut self, account: &Address, value: u64, block: u64) -> GovResult<()> {
        self.accounts.entry(*account).or_default().write(value, block)
    }

    /// Fails if `account` cannot be written at `block`
    pub fn ensure_writable(&self, account: &Address, block: u64) -> GovResult<()> {
        match self.accounts.get(account) {
            Some(history) => history.ensure_writable(block),
            None => Ok(()),
        }
    }

    /// Fails if total supply cannot be written at `block`
    pub fn ensure_total_writable(&self, block: u64) -> GovResult<()> {
        self.total_supply.ensure_writable(block)
    }

    /// Voting power of `account` as of `block`
    pub fn value_at(&self, account: &Address, block: u64, current_block: u64) -> GovResult<u64> {
        match self.accounts.get(account) {
            Some(history) => history.value_at(block, current_block),
            None => CheckpointHistory::new().value_at(block, current_block),
        }
    }

    /// Current (still mutable) voting power of `account`
    pub fn latest_value(&self, account: &Address) -> u64 {
        self.accounts.get(account).map(|h| h.latest()).unwrap_or(0)
    }

    /// Record total supply as `value` from `block`
    pub fn write_total(&mut self, value: u64, block: u64) -> GovResult<()> {
        self.total_supply.write(value, block)
    }

    /// Total supply as of `block`
    pub fn total_at(&self, block: u64, current_block: u64) -> GovResult<u64> {
        self.total_supply.value_at(block, current_block)
    }

    /// Current total supply
    pub fn latest_total(&self) -> u64 {
        self.total_supply.latest()
    }

    /// Number of checkpoints recorded for `account`
    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.accounts.get(account).map(|h| h.len()).unwrap_or(0)
    }

    /// Checkpoint `index` of `account`
    pub fn checkpoint(&self, account: &Address, index: usize) -> Option<Checkpoint> {
        self.accounts.get(account).and_then(|h| h.get(index)).copied()
    }

    /// Full history of `account`, if any
    pub fn history(&self, account: &Address) -> Option<&CheckpointHistory> {
        self.accounts.get(account)
    }

    /// Sum of every account's voting power as of `block`
    pub fn delegated_total_at(&self, block: u64, current_block: u64) -> GovResult<u128> {
        let mut sum = 0u128;
        for history in self.accounts.values() {
            sum += history.value_at(block, current_block)? as u128;
        }
        Ok(sum)
    }
}

impl VotingPowerSource for CheckpointLedger {
    fn prior_votes(&self, account: &Address, block: u64, current_block: u64) -> GovResult<u64> {
        self.value_at(account, block, current_block)
    }

    fn prior_total_supply(&self, block: u64, current_block: u64) -> GovResult<u64> {
        self.total_at(block, current_block)
    }
}
