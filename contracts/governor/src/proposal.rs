//! Proposals and Their Lifecycle
//!
//! A proposal stores only raw facts (blocks, tallies, flags); its state is
//! derived from them on every read:
//!
//! ```text
//! Canceled   if canceled
//! Pending    else if now < start_block
//! Active     else if now < end_block
//! Defeated   else if for <= against or quorum not met
//! Succeeded  else if eta == 0
//! Executed   else if executed
//! Expired    else if now >= eta + GRACE_PERIOD
//! Queued     otherwise
//! ```

use ballot_common::{
    constants::timelock::GRACE_PERIOD,
    errors::GovResult,
    math,
    types::{Address, Support},
    BTreeMap, String, Vec,
};
use ballot_timelock::TimelockTx;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl ProposalState {
    /// Pending or Active
    pub fn is_live(&self) -> bool {
        matches!(self, ProposalState::Pending | ProposalState::Active)
    }
}

/// One call a proposal makes when executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Action {
    pub target: Address,
    pub value: u64,
    pub signature: String,
    pub calldata: Vec<u8>,
}

/// A voter's ballot on one proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: Support,
    /// Weight counted, fixed at `start_block - 1`
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    pub description: String,
    /// Block at which queued actions mature (0 until queued)
    pub eta: u64,
    pub actions: Vec<Action>,
    /// First block of the voting window
    pub start_block: u64,
    /// First block after the voting window
    pub end_block: u64,
    pub for_votes: u64,
    pub against_votes: u64,
    pub canceled: bool,
    pub executed: bool,
    receipts: BTreeMap<Address, Receipt>,
}

impl Proposal {
    pub fn new(
        id: u64,
        proposer: Address,
        description: String,
        actions: Vec<Action>,
        start_block: u64,
        end_block: u64,
    ) -> Self {
        Self {
            id,
            proposer,
            description,
            eta: 0,
            actions,
            start_block,
            end_block,
            for_votes: 0,
            against_votes: 0,
            canceled: false,
            executed: false,
            receipts: BTreeMap::new(),
        }
    }

    /// Block whose voting power and supply the vote is measured against
    pub fn snapshot_block(&self) -> u64 {
        self.start_block.saturating_sub(1)
    }

    /// State while the outcome does not depend on the tally
    ///
    /// Returns `None` once voting has closed.
    pub fn voting_state(&self, now: u64) -> Option<ProposalState> {
        if self.canceled {
            Some(ProposalState::Canceled)
        } else if now < self.start_block {
            Some(ProposalState::Pending)
        } else if now < self.end_block {
            Some(ProposalState::Active)
        } else {
            None
        }
    }

    /// State after voting closed, given the quorum for this proposal
    pub fn settled_state(&self, now: u64, quorum_votes: u64) -> ProposalState {
        if self.for_votes <= self.against_votes || !self.quorum_met(quorum_votes) {
            ProposalState::Defeated
        } else if self.eta == 0 {
            ProposalState::Succeeded
        } else if self.executed {
            ProposalState::Executed
        } else if now >= self.eta.saturating_add(GRACE_PERIOD) {
            ProposalState::Expired
        } else {
            ProposalState::Queued
        }
    }

    pub fn quorum_met(&self, quorum_votes: u64) -> bool {
        math::total_votes(self.for_votes, self.against_votes) >= quorum_votes as u128
    }

    pub fn receipt(&self, voter: &Address) -> Option<Receipt> {
        self.receipts.get(voter).copied()
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.receipts.get(voter).map(|r| r.has_voted).unwrap_or(false)
    }

    /// Count `votes` for `voter`
    pub fn record_vote(&mut self, voter: Address, support: Support, votes: u64) -> GovResult<()> {
        match support {
            Support::For => self.for_votes = math::add(self.for_votes, votes)?,
            Support::Against => self.against_votes = math::add(self.against_votes, votes)?,
        }
        self.receipts.insert(
            voter,
            Receipt {
                has_voted: true,
                support,
                votes,
            },
        );
        Ok(())
    }

    /// Timelock transactions for every action at `eta`
    pub fn timelock_txs(&self, eta: u64) -> Vec<TimelockTx> {
        self.actions
            .iter()
            .map(|action| TimelockTx {
                proposal_id: self.id,
                target: action.target,
                value: action.value,
                signature: action.signature.clone(),
                calldata: action.calldata.clone(),
                eta,
            })
            .collect()
    }
}
