//! Ballot Timelock
//!
//! Holds governance actions for a mandatory delay before they can run. A
//! transaction is identified by the digest of its full contents, so the same
//! call scheduled under a different proposal or eta is a distinct entry.
//!
//! ## Lifecycle
//!
//! ```text
//! enqueue (eta >= now + delay) -> [wait until eta] -> execute (before eta + GRACE_PERIOD)
//!                              \-> cancel
//! ```
//!
//! Only the controller (the governor, once control is handed over) may
//! enqueue, execute or cancel. Control can be handed over exactly once.
//! Executed transactions stay recorded as queued; the governor's
//! `executed` flag is what prevents a second run.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod dispatch;

pub use dispatch::{CallDispatcher, OutboundCall};

use ballot_common::{
    check,
    constants::timelock::{GRACE_PERIOD, MAX_DELAY, MIN_DELAY, SET_DELAY_SIGNATURE},
    errors::{GovError, GovResult},
    events::{EventLog, GovEvent, QueuedTxRecord},
    signing::selector,
    types::{Address, CallContext, TxDigest},
    validation::{require_caller, require_in_range, require_valid_address},
    BTreeSet, String, Vec,
};

// ============ Transactions ============

/// A call scheduled in the timelock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TimelockTx {
    /// Proposal the call belongs to
    pub proposal_id: u64,
    /// Contract to call
    pub target: Address,
    /// Native value to send
    pub value: u64,
    /// Function signature; empty means `calldata` is sent as is
    pub signature: String,
    /// Call arguments
    pub calldata: Vec<u8>,
    /// Earliest execution block
    pub eta: u64,
}

impl TimelockTx {
    /// SHA-256 over the fields in declaration order, variable-length
    /// fields prefixed with their `u64` length
    pub fn digest(&self) -> TxDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.proposal_id.to_le_bytes());
        hasher.update(self.target);
        hasher.update(self.value.to_le_bytes());
        hasher.update((self.signature.len() as u64).to_le_bytes());
        hasher.update(self.signature.as_bytes());
        hasher.update((self.calldata.len() as u64).to_le_bytes());
        hasher.update(&self.calldata);
        hasher.update(self.eta.to_le_bytes());
        hasher.finalize().into()
    }

    /// Bytes handed to the dispatcher
    pub fn payload(&self) -> Vec<u8> {
        if self.signature.is_empty() {
            return self.calldata.clone();
        }
        let sel = selector(&self.signature);
        let mut payload = Vec::with_capacity(sel.len() + self.calldata.len());
        payload.extend_from_slice(&sel);
        payload.extend_from_slice(&self.calldata);
        payload
    }

    fn record(&self, digest: TxDigest) -> QueuedTxRecord {
        QueuedTxRecord {
            digest,
            proposal_id: self.proposal_id,
            target: self.target,
            value: self.value,
            signature: self.signature.clone(),
            calldata: self.calldata.clone(),
            eta: self.eta,
        }
    }
}

// ============ Timelock State ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Timelock {
    /// Address of this timelock (target of self-calls)
    pub address: Address,
    controller: Address,
    pending_controller: Option<Address>,
    control_transferred: bool,
    delay: u64,
    queued: BTreeSet<TxDigest>,
    #[serde(skip)]
    #[borsh(skip)]
    events: EventLog,
}

impl Timelock {
    /// Deploy a timelock controlled by `controller`
    pub fn new(address: Address, controller: Address, delay: u64) -> GovResult<Self> {
        require_valid_address(&address, "timelock address is zero")?;
        require_valid_address(&controller, "controller is zero")?;
        require_in_range(delay, MIN_DELAY, MAX_DELAY, "delay")?;

        Ok(Self {
            address,
            controller,
            pending_controller: None,
            control_transferred: false,
            delay,
            queued: BTreeSet::new(),
            events: EventLog::new(),
        })
    }

    /// Schedule `tx`; returns its digest
    pub fn enqueue(&mut self, ctx: &CallContext, tx: &TimelockTx) -> GovResult<TxDigest> {
        require_caller(self.controller, ctx.caller)?;
        let earliest = ctx.block_height.checked_add(self.delay).ok_or(GovError::Overflow)?;
        check!(
            tx.eta >= earliest,
            GovError::EtaBelowDelay { eta: tx.eta, earliest }
        );

        let digest = tx.digest();
        self.queued.insert(digest);
        self.events.emit(GovEvent::QueueTransaction {
            tx: tx.record(digest),
            block_height: ctx.block_height,
        });
        Ok(digest)
    }

    /// Run a matured transaction; returns the call's result data
    pub fn execute<D: CallDispatcher>(
        &mut self,
        ctx: &CallContext,
        tx: &TimelockTx,
        dispatcher: &mut D,
    ) -> GovResult<Vec<u8>> {
        require_caller(self.controller, ctx.caller)?;
        let digest = tx.digest();
        check!(self.queued.contains(&digest), GovError::NotQueued);
        check!(
            ctx.block_height >= tx.eta,
            GovError::DelayNotPassed {
                eta: tx.eta,
                current_block: ctx.block_height,
            }
        );
        check!(
            ctx.block_height < tx.eta.saturating_add(GRACE_PERIOD),
            GovError::Expired {
                eta: tx.eta,
                current_block: ctx.block_height,
            }
        );

        let result = if tx.target == self.address {
            self.self_call(ctx, tx)
                .map(|_| Vec::new())
                .map_err(|_| GovError::ExecutionReverted { digest })?
        } else {
            let call = OutboundCall {
                target: tx.target,
                value: tx.value,
                payload: tx.payload(),
            };
            dispatcher
                .dispatch(&call)
                .map_err(|_| GovError::ExecutionReverted { digest })?
        };

        self.events.emit(GovEvent::ExecuteTransaction {
            tx: tx.record(digest),
            block_height: ctx.block_height,
        });
        Ok(result)
    }

    /// Calls addressed to the timelock itself
    fn self_call(&mut self, ctx: &CallContext, tx: &TimelockTx) -> GovResult<()> {
        check!(
            tx.signature == SET_DELAY_SIGNATURE,
            GovError::InvalidParameter {
                param: "signature",
                reason: "unsupported self-call",
            }
        );
        let new_delay: u64 = borsh::from_slice(&tx.calldata).map_err(|_| GovError::InvalidParameter {
            param: "calldata",
            reason: "expected u64 delay",
        })?;
        let own = ctx.as_caller(self.address);
        self.set_delay(&own, new_delay)
    }

    /// Drop `tx` from the queue; canceling an absent entry is a no-op
    pub fn cancel(&mut self, ctx: &CallContext, tx: &TimelockTx) -> GovResult<TxDigest> {
        require_caller(self.controller, ctx.caller)?;
        let digest = tx.digest();
        self.queued.remove(&digest);
        self.events.emit(GovEvent::CancelTransaction {
            tx: tx.record(digest),
            block_height: ctx.block_height,
        });
        Ok(digest)
    }

    // ============ Administration ============

    /// Nominate the next controller (current controller only, once)
    pub fn set_pending_controller(&mut self, ctx: &CallContext, pending: Address) -> GovResult<()> {
        require_caller(self.controller, ctx.caller)?;
        check!(!self.control_transferred, GovError::ControlAlreadyTransferred);
        require_valid_address(&pending, "pending controller is zero")?;

        self.pending_controller = Some(pending);
        self.events.emit(GovEvent::NewPendingController {
            pending_controller: pending,
            block_height: ctx.block_height,
        });
        Ok(())
    }

    /// Take over control (pending controller only)
    pub fn accept_controller(&mut self, ctx: &CallContext) -> GovResult<()> {
        check!(!self.control_transferred, GovError::ControlAlreadyTransferred);
        let pending = self.pending_controller.ok_or(GovError::NoPendingController)?;
        require_caller(pending, ctx.caller)?;

        self.controller = pending;
        self.pending_controller = None;
        self.control_transferred = true;
        self.events.emit(GovEvent::NewController {
            controller: pending,
            block_height: ctx.block_height,
        });
        Ok(())
    }

    /// Change the delay; only reachable through a queued self-call
    pub fn set_delay(&mut self, ctx: &CallContext, new_delay: u64) -> GovResult<()> {
        require_caller(self.address, ctx.caller)?;
        require_in_range(new_delay, MIN_DELAY, MAX_DELAY, "delay")?;

        self.delay = new_delay;
        self.events.emit(GovEvent::NewDelay {
            delay: new_delay,
            block_height: ctx.block_height,
        });
        Ok(())
    }

    // ============ Views ============

    pub fn controller(&self) -> Address {
        self.controller
    }

    pub fn pending_controller(&self) -> Option<Address> {
        self.pending_controller
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn grace_period() -> u64 {
        GRACE_PERIOD
    }

    pub fn is_queued(&self, digest: &TxDigest) -> bool {
        self.queued.contains(digest)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GovEvent> {
        self.events.drain()
    }
}
