//! Ballot Common Library
//!
//! Shared types, constants, and building blocks for the Ballot governance
//! contracts (voting token, timelock, governor).
//!
//! ## Components
//!
//! - **Checkpoint Ledger**: Append-only voting power history per account,
//!   plus a parallel total supply history, answering point-in-time queries
//! - **Signing**: Domain-separated typed digests for vote and delegation
//!   signatures, and the `SignatureRecovery` seam
//! - **Events**: Structured records emitted by every successful operation
//! - **Errors**: One error enum shared by all contracts, with stable codes
//!   and a failure taxonomy
//!
//! ## Execution Model
//!
//! Every operation runs to completion against a single block counter that
//! the host supplies through [`types::CallContext`]. Waiting periods (voting
//! delay, timelock delay, grace period) are plain comparisons against that
//! counter, evaluated lazily on each read.
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, collections::BTreeSet, string::String, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, collections::BTreeSet, string::String, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod validation;
pub mod checkpoints;
pub mod signing;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use events::{EventLog, EventType, GovEvent};
pub use checkpoints::{Checkpoint, CheckpointHistory, CheckpointLedger, VotingPowerSource};
pub use signing::{DomainSeparator, SignatureRecovery};
