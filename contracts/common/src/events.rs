//! Protocol Events for Ballot
//!
//! Events are the structured log of the protocol: every successful operation
//! emits one or more records that can be indexed off-chain. A failed
//! operation emits nothing.

use crate::types::{Address, Support, TxDigest};
use crate::{String, Vec};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Token Events (0x01 - 0x1F)
    Transfer = 0x01,
    DelegateChanged = 0x02,
    DelegateVotesChanged = 0x03,

    // Governor Events (0x20 - 0x3F)
    ProposalCreated = 0x20,
    VoteCast = 0x21,
    ProposalCanceled = 0x22,
    ProposalQueued = 0x23,
    ProposalExecuted = 0x24,
    GuardianAbdicated = 0x25,

    // Timelock Events (0x40 - 0x5F)
    QueueTransaction = 0x40,
    ExecuteTransaction = 0x41,
    CancelTransaction = 0x42,
    NewPendingController = 0x43,
    NewController = 0x44,
    NewDelay = 0x45,
}

/// Fields identifying a timelock transaction, shared by its three events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct QueuedTxRecord {
    /// Content digest of the transaction
    pub digest: TxDigest,
    /// Proposal the transaction belongs to
    pub proposal_id: u64,
    /// Call target
    pub target: Address,
    /// Native value carried by the call
    pub value: u64,
    /// Function signature (empty for raw calldata)
    pub signature: String,
    /// Call arguments
    pub calldata: Vec<u8>,
    /// Scheduled execution block
    pub eta: u64,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum GovEvent {
    // ============ Token Events ============

    /// Emitted on transfer, mint (`from = None`) and burn (`to = None`)
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: u64,
        block_height: u64,
    },

    /// Emitted when an account changes its delegatee
    DelegateChanged {
        delegator: Address,
        from_delegate: Option<Address>,
        to_delegate: Option<Address>,
        block_height: u64,
    },

    /// Emitted when a delegatee's checkpointed votes change
    DelegateVotesChanged {
        delegate: Address,
        previous_votes: u64,
        new_votes: u64,
        block_height: u64,
    },

    // ============ Governor Events ============

    /// Emitted when a proposal is created
    ProposalCreated {
        proposal_id: u64,
        proposer: Address,
        targets: Vec<Address>,
        start_block: u64,
        end_block: u64,
        description: String,
        block_height: u64,
    },

    /// Emitted when a vote is counted
    VoteCast {
        voter: Address,
        proposal_id: u64,
        support: Support,
        votes: u64,
        block_height: u64,
    },

    /// Emitted when the guardian cancels a proposal
    ProposalCanceled {
        proposal_id: u64,
        block_height: u64,
    },

    /// Emitted when a proposal's actions enter the timelock
    ProposalQueued {
        proposal_id: u64,
        eta: u64,
        block_height: u64,
    },

    /// Emitted when all of a proposal's actions were executed
    ProposalExecuted {
        proposal_id: u64,
        block_height: u64,
    },

    /// Emitted when the guardian gives up the role
    GuardianAbdicated {
        guardian: Address,
        block_height: u64,
    },

    // ============ Timelock Events ============

    /// Emitted when a transaction is queued
    QueueTransaction {
        tx: QueuedTxRecord,
        block_height: u64,
    },

    /// Emitted when a queued transaction is executed
    ExecuteTransaction {
        tx: QueuedTxRecord,
        block_height: u64,
    },

    /// Emitted when a queued transaction is canceled
    CancelTransaction {
        tx: QueuedTxRecord,
        block_height: u64,
    },

    /// Emitted when a pending controller is nominated
    NewPendingController {
        pending_controller: Address,
        block_height: u64,
    },

    /// Emitted when the pending controller accepts control
    NewController {
        controller: Address,
        block_height: u64,
    },

    /// Emitted when the timelock delay changes
    NewDelay {
        delay: u64,
        block_height: u64,
    },
}

impl GovEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Transfer { .. } => EventType::Transfer,
            Self::DelegateChanged { .. } => EventType::DelegateChanged,
            Self::DelegateVotesChanged { .. } => EventType::DelegateVotesChanged,
            Self::ProposalCreated { .. } => EventType::ProposalCreated,
            Self::VoteCast { .. } => EventType::VoteCast,
            Self::ProposalCanceled { .. } => EventType::ProposalCanceled,
            Self::ProposalQueued { .. } => EventType::ProposalQueued,
            Self::ProposalExecuted { .. } => EventType::ProposalExecuted,
            Self::GuardianAbdicated { .. } => EventType::GuardianAbdicated,
            Self::QueueTransaction { .. } => EventType::QueueTransaction,
            Self::ExecuteTransaction { .. } => EventType::ExecuteTransaction,
            Self::CancelTransaction { .. } => EventType::CancelTransaction,
            Self::NewPendingController { .. } => EventType::NewPendingController,
            Self::NewController { .. } => EventType::NewController,
            Self::NewDelay { .. } => EventType::NewDelay,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::Transfer { block_height, .. }
            | Self::DelegateChanged { block_height, .. }
            | Self::DelegateVotesChanged { block_height, .. }
            | Self::ProposalCreated { block_height, .. }
            | Self::VoteCast { block_height, .. }
            | Self::ProposalCanceled { block_height, .. }
            | Self::ProposalQueued { block_height, .. }
            | Self::ProposalExecuted { block_height, .. }
            | Self::GuardianAbdicated { block_height, .. }
            | Self::QueueTransaction { block_height, .. }
            | Self::ExecuteTransaction { block_height, .. }
            | Self::CancelTransaction { block_height, .. }
            | Self::NewPendingController { block_height, .. }
            | Self::NewController { block_height, .. }
            | Self::NewDelay { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EventLog {
    events: Vec<GovEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: GovEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[GovEvent] {
        &self.events
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&GovEvent> {
        self.events.last()
    }

    /// Take ownership of all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<GovEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&GovEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Position to roll back to if a composite operation fails
    pub fn mark(&self) -> usize {
        self.events.len()
    }

    /// Discard events emitted after `mark`
    pub fn rollback_to(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
