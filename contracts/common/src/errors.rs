//! Error Types for the Ballot Protocol
//!
//! Every contract operation either fully succeeds or returns one of these
//! errors with no state mutated. Variants carry the values that caused the
//! failure so callers can report them without re-deriving context.

use crate::types::{Address, TxDigest};

/// Result type alias for Ballot operations
pub type GovResult<T> = Result<T, GovError>;

/// Main error enum for all Ballot protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovError {
    // ============ Authorization Errors ============
    /// Proposer's prior votes are below the proposal threshold
    ThresholdNotMet { votes: u64, threshold: u64 },

    /// Only the guardian can perform this action
    MustBeGuardian { caller: Address },

    /// Caller is not the principal required for this operation
    Unauthorized { expected: Address, actual: Address },

    /// Signature does not recover to any account
    InvalidSignature,

    /// Signature recovered to a different account than the claimed signer
    SignerMismatch { expected: Address, recovered: Address },

    /// Mint not authorized
    MintUnauthorized { caller: Address },

    // ============ State Precondition Errors ============
    /// Vote cast on a proposal that is not Active
    ProposalNotActive { proposal_id: u64 },

    /// Queue requested for a proposal that has not Succeeded
    MustBeSucceeded { proposal_id: u64 },

    /// Execution requested for something that is not queued
    NotQueued,

    /// Cancel requested for an Executed or already Canceled proposal
    CannotCancel { proposal_id: u64 },

    /// Proposer already has a Pending or Active proposal
    ProposerHasLiveProposal { live_proposal_id: u64 },

    /// Timelock control was already handed over once
    ControlAlreadyTransferred,

    /// No pending controller to accept
    NoPendingController,

    // ============ Temporal Errors ============
    /// Timelock delay has not elapsed yet
    DelayNotPassed { eta: u64, current_block: u64 },

    /// Grace period after eta has elapsed
    Expired { eta: u64, current_block: u64 },

    /// Signature deadline passed
    SignatureExpired { expiry: u64, current_block: u64 },

    /// Historical query for the current or a future block
    BlockNotYetMined { block: u64, current_block: u64 },

    /// Requested eta is sooner than the timelock delay allows
    EtaBelowDelay { eta: u64, earliest: u64 },

    // ============ Structural / Input Errors ============
    /// Zero actions or more than the configured maximum
    InvalidActionCount { count: usize, maximum: usize },

    /// Parallel action lists differ in length
    ArrayLengthMismatch,

    /// Unknown proposal id (0 or greater than the proposal count)
    InvalidProposalId { proposal_id: u64 },

    /// Voter already has a receipt on this proposal
    AlreadyVoted { proposal_id: u64, voter: Address },

    /// Identical action already present in the timelock queue
    AlreadyQueued { digest: TxDigest },

    /// Nonce does not match the signer's next nonce
    InvalidNonce { expected: u64, provided: u64 },

    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// Zero amount not allowed
    ZeroAmount,

    /// Insufficient balance for operation
    InsufficientBalance { available: u64, requested: u64 },

    /// Amount exceeds maximum allowed
    ExceedsMaximum { amount: u64, maximum: u64 },

    /// Invalid parameter value
    InvalidParameter { param: &'static str, reason: &'static str },

    /// Internal ordering invariant broken (e.g., checkpoint written in the past)
    InvariantViolation { reason: &'static str },

    // ============ Downstream Errors ============
    /// A dispatched call reported failure
    ExecutionReverted { digest: TxDigest },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,
}

/// Failure taxonomy used for reporting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller lacks the required role or signature
    Authorization,
    /// Target is not in the required lifecycle state
    StatePrecondition,
    /// Delay not elapsed, grace period or deadline passed
    Temporal,
    /// Malformed input or duplicate submission
    Structural,
    /// A dispatched action failed
    Downstream,
    /// Checked arithmetic failed
    Arithmetic,
}

impl GovError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::ThresholdNotMet { .. } => "E001_THRESHOLD_NOT_MET",
            Self::MustBeGuardian { .. } => "E002_MUST_BE_GUARDIAN",
            Self::Unauthorized { .. } => "E003_UNAUTHORIZED",
            Self::InvalidSignature => "E004_INVALID_SIGNATURE",
            Self::SignerMismatch { .. } => "E005_SIGNER_MISMATCH",
            Self::MintUnauthorized { .. } => "E006_MINT_UNAUTH",
            Self::ProposalNotActive { .. } => "E010_PROPOSAL_NOT_ACTIVE",
            Self::MustBeSucceeded { .. } => "E011_MUST_BE_SUCCEEDED",
            Self::NotQueued => "E012_NOT_QUEUED",
            Self::CannotCancel { .. } => "E013_CANNOT_CANCEL",
            Self::ProposerHasLiveProposal { .. } => "E014_LIVE_PROPOSAL",
            Self::ControlAlreadyTransferred => "E015_CONTROL_TRANSFERRED",
            Self::NoPendingController => "E016_NO_PENDING_CONTROLLER",
            Self::DelayNotPassed { .. } => "E020_DELAY_NOT_PASSED",
            Self::Expired { .. } => "E021_EXPIRED",
            Self::SignatureExpired { .. } => "E022_SIGNATURE_EXPIRED",
            Self::BlockNotYetMined { .. } => "E023_BLOCK_NOT_MINED",
            Self::EtaBelowDelay { .. } => "E024_ETA_BELOW_DELAY",
            Self::InvalidActionCount { .. } => "E030_INVALID_ACTION_COUNT",
            Self::ArrayLengthMismatch => "E031_ARRAY_MISMATCH",
            Self::InvalidProposalId { .. } => "E032_INVALID_PROPOSAL_ID",
            Self::AlreadyVoted { .. } => "E033_ALREADY_VOTED",
            Self::AlreadyQueued { .. } => "E034_ALREADY_QUEUED",
            Self::InvalidNonce { .. } => "E035_INVALID_NONCE",
            Self::InvalidAddress { .. } => "E036_INVALID_ADDRESS",
            Self::ZeroAmount => "E037_ZERO_AMOUNT",
            Self::InsufficientBalance { .. } => "E038_INSUFFICIENT_BALANCE",
            Self::ExceedsMaximum { .. } => "E039_EXCEEDS_MAXIMUM",
            Self::InvalidParameter { .. } => "E040_INVALID_PARAM",
            Self::InvariantViolation { .. } => "E041_INVARIANT",
            Self::ExecutionReverted { .. } => "E050_EXECUTION_REVERTED",
            Self::Overflow => "E060_OVERFLOW",
            Self::Underflow => "E061_UNDERFLOW",
        }
    }

    /// Returns the taxonomy bucket of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ThresholdNotMet { .. }
            | Self::MustBeGuardian { .. }
            | Self::Unauthorized { .. }
            | Self::InvalidSignature
            | Self::SignerMismatch { .. }
            | Self::MintUnauthorized { .. } => ErrorCategory::Authorization,

            Self::ProposalNotActive { .. }
            | Self::MustBeSucceeded { .. }
            | Self::NotQueued
            | Self::CannotCancel { .. }
            | Self::ProposerHasLiveProposal { .. }
            | Self::ControlAlreadyTransferred
            | Self::NoPendingController => ErrorCategory::StatePrecondition,

            Self::DelayNotPassed { .. }
            | Self::Expired { .. }
            | Self::SignatureExpired { .. }
            | Self::BlockNotYetMined { .. }
            | Self::EtaBelowDelay { .. } => ErrorCategory::Temporal,

            Self::ExecutionReverted { .. } => ErrorCategory::Downstream,

            Self::Overflow | Self::Underflow => ErrorCategory::Arithmetic,

            _ => ErrorCategory::Structural,
        }
    }

    /// Returns true if waiting (without changing the request) could make it succeed
    pub fn is_retryable_later(&self) -> bool {
        matches!(self, Self::DelayNotPassed { .. } | Self::BlockNotYetMined { .. })
    }
}
