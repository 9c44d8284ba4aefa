//! Outbound Call Dispatch
//!
//! The timelock never touches other contracts directly; matured transactions
//! are handed to a [`CallDispatcher`] supplied by the host. The dispatcher
//! exposes savepoints so that a multi-call execution can be undone as a
//! whole when a later call fails.

use ballot_common::{types::Address, Vec};

/// A call leaving the timelock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    /// Contract being called
    pub target: Address,
    /// Native value sent with the call
    pub value: u64,
    /// Selector-prefixed calldata, or raw calldata
    pub payload: Vec<u8>,
}

/// Host-side executor for outbound calls
pub trait CallDispatcher {
    /// Perform `call`; `Err` carries revert data
    fn dispatch(&mut self, call: &OutboundCall) -> Result<Vec<u8>, Vec<u8>>;

    /// Marker for the current dispatcher state
    fn savepoint(&self) -> usize;

    /// Undo every effect recorded after `savepoint`
    fn rollback_to(&mut self, savepoint: usize);
}

/// Dispatcher that records calls and reverts for chosen targets
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct RecordingDispatcher {
        calls: Vec<OutboundCall>,
        reverting: Vec<Address>,
    }

    impl RecordingDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every call to `target` revert
        pub fn revert_on(&mut self, target: Address) {
            self.reverting.push(target);
        }

        /// Calls that went through, in order
        pub fn calls(&self) -> &[OutboundCall] {
            &self.calls
        }
    }

    impl CallDispatcher for RecordingDispatcher {
        fn dispatch(&mut self, call: &OutboundCall) -> Result<Vec<u8>, Vec<u8>> {
            if self.reverting.contains(&call.target) {
                return Err(b"reverted".to_vec());
            }
            self.calls.push(call.clone());
            Ok(Vec::new())
        }

        fn savepoint(&self) -> usize {
            self.calls.len()
        }

        fn rollback_to(&mut self, savepoint: usize) {
            self.calls.truncate(savepoint);
        }
    }
}
