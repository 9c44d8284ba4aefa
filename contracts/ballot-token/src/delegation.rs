//! Delegation Registry
//!
//! Maps each account to the delegatee that receives its voting power and
//! keeps the checkpoint ledger in step with balances. Every change is
//! planned first (arithmetic and checkpoint ordering checked) and only then
//! written, so a failed operation leaves the ledger untouched.

use ballot_common::{
    checkpoints::CheckpointLedger,
    errors::{GovError, GovResult},
    math,
    types::{is_zero_address, Address},
    BTreeMap, Vec,
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// One delegatee's vote count moving from `previous_votes` to `new_votes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteChange {
    pub delegate: Address,
    pub previous_votes: u64,
    pub new_votes: u64,
}

/// Total supply moving from `previous` to `new`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyChange {
    pub previous: u64,
    pub new: u64,
}

/// Result of a delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationOutcome {
    /// Delegatee before the call
    pub from_delegate: Option<Address>,
    /// Delegatee after the call
    pub to_delegate: Option<Address>,
    /// Checkpoint writes performed
    pub vote_changes: Vec<VoteChange>,
}

/// Result of a balance movement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceChangeOutcome {
    pub vote_changes: Vec<VoteChange>,
    pub supply_change: Option<SupplyChange>,
}

/// Account -> delegatee mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DelegationRegistry {
    delegates: BTreeMap<Address, Address>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current delegatee of `account`, if any
    pub fn delegatee(&self, account: &Address) -> Option<Address> {
        self.delegates.get(account).copied()
    }

    /// Point `delegator`'s voting power at `to` (zero address revokes)
    ///
    /// `balance` is the delegator's current balance, which moves from the old
    /// delegatee to the new one. Re-delegating to the same account writes no
    /// checkpoints.
    pub fn delegate(
        &mut self,
        ledger: &mut CheckpointLedger,
        delegator: Address,
        to: Address,
        balance: u64,
        block: u64,
    ) -> GovResult<DelegationOutcome> {
        let from_delegate = self.delegatee(&delegator);
        let to_delegate = if is_zero_address(&to) { None } else { Some(to) };

        let vote_changes = plan_move(ledger, from_delegate, to_delegate, balance, block)?;

        match to_delegate {
            Some(delegatee) => {
                self.delegates.insert(delegator, delegatee);
            }
            None => {
                self.delegates.remove(&delegator);
            }
        }
        apply(ledger, &vote_changes, block)?;

        Ok(DelegationOutcome {
            from_delegate,
            to_delegate,
            vote_changes,
        })
    }

    /// Move voting power along with `amount` tokens
    ///
    /// `from = None` is a mint and `to = None` a burn; both also move the
    /// total supply history.
    pub fn on_balance_change(
        &self,
        ledger: &mut CheckpointLedger,
        from: Option<Address>,
        to: Option<Address>,
        amount: u64,
        block: u64,
    ) -> GovResult<BalanceChangeOutcome> {
        let src = from.and_then(|account| self.delegatee(&account));
        let dst = to.and_then(|account| self.delegatee(&account));
        let vote_changes = plan_move(ledger, src, dst, amount, block)?;

        let supply_change = match (from, to) {
            (None, Some(_)) => {
                let previous = ledger.latest_total();
                Some(SupplyChange {
                    previous,
                    new: math::add(previous, amount)?,
                })
            }
            (Some(_), None) => {
                let previous = ledger.latest_total();
                Some(SupplyChange {
                    previous,
                    new: math::sub(previous, amount)?,
                })
            }
            _ => None,
        };
        if supply_change.is_some() {
            ledger.ensure_total_writable(block)?;
        }

        apply(ledger, &vote_changes, block)?;
        if let Some(change) = supply_change {
            ledger.write_total(change.new, block)?;
        }

        Ok(BalanceChangeOutcome {
            vote_changes,
            supply_change,
        })
    }
}

/// Compute the checkpoint writes for moving `amount` votes from `src` to `dst`
fn plan_move(
    ledger: &CheckpointLedger,
    src: Option<Address>,
    dst: Option<Address>,
    amount: u64,
    block: u64,
) -> GovResult<Vec<VoteChange>> {
    let mut changes = Vec::new();
    if src == dst || amount == 0 {
        return Ok(changes);
    }

    if let Some(delegate) = src {
        ledger.ensure_writable(&delegate, block)?;
        let previous_votes = ledger.latest_value(&delegate);
        let new_votes = previous_votes.checked_sub(amount).ok_or(GovError::InvariantViolation {
            reason: "delegated votes below moved balance",
        })?;
        changes.push(VoteChange {
            delegate,
            previous_votes,
            new_votes,
        });
    }

    if let Some(delegate) = dst {
        ledger.ensure_writable(&delegate, block)?;
        let previous_votes = ledger.latest_value(&delegate);
        changes.push(VoteChange {
            delegate,
            previous_votes,
            new_votes: math::add(previous_votes, amount)?,
        });
    }

    Ok(changes)
}

fn apply(ledger: &mut CheckpointLedger, changes: &[VoteChange], block: u64) -> GovResult<()> {
    for change in changes {
        ledger.write(&change.delegate, change.new_votes, block)?;
    }
    Ok(())
}
