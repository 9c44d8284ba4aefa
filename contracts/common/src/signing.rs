//! Signature Digests and Nonces
//!
//! Typed, domain-separated digests for signature-authorized actions
//! (votes and delegations), modeled on EIP-712 but hashed with SHA-256:
//!
//! ```text
//! domain    = H( H(DOMAIN_TYPE_TAG) || H(name) || H(version) || chain_id || contract )
//! struct    = H( H(TYPE_TAG) || fields... )
//! digest    = H( 0x19 0x01 || domain || struct )
//! ```
//!
//! Binding the contract address and chain id prevents a signature made for
//! one deployment from being replayed against another. Recovering the signer
//! from a digest is delegated to a [`SignatureRecovery`] implementation.

use crate::constants::signing::{
    BALLOT_TYPE_TAG, DELEGATION_TYPE_TAG, DIGEST_PREFIX, DOMAIN_TYPE_TAG, DOMAIN_VERSION,
};
use crate::constants::timelock::SELECTOR_LEN;
use crate::errors::{GovError, GovResult};
use crate::types::{Address, Hash, Signature, Support};
use crate::{BTreeMap, String};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Recovers the account that signed a digest
///
/// Returns `None` when the signature is malformed or does not verify.
pub trait SignatureRecovery {
    fn recover(&self, digest: &Hash, signature: &Signature) -> Option<Address>;
}

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Four-byte function selector derived from a signature string
pub fn selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let hash = sha256(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&hash[..SELECTOR_LEN]);
    out
}

/// Identity of a signing domain (one deployed contract)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DomainSeparator {
    /// Human-readable contract name
    pub name: String,
    /// Domain version
    pub version: String,
    /// Chain / deployment identifier
    pub chain_id: u64,
    /// Address of the verifying contract
    pub verifying_contract: Address,
}

impl DomainSeparator {
    /// Domain for `name` at `verifying_contract` using the protocol version
    pub fn new(name: &str, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: String::from(name),
            version: String::from(DOMAIN_VERSION),
            chain_id,
            verifying_contract,
        }
    }

    /// Hash of the domain fields
    pub fn separator(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(sha256(DOMAIN_TYPE_TAG));
        hasher.update(sha256(self.name.as_bytes()));
        hasher.update(sha256(self.version.as_bytes()));
        hasher.update(self.chain_id.to_be_bytes());
        hasher.update(self.verifying_contract);
        hasher.finalize().into()
    }

    /// Final digest to sign for a typed struct hash
    pub fn digest(&self, struct_hash: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_PREFIX);
        hasher.update(self.separator());
        hasher.update(struct_hash);
        hasher.finalize().into()
    }

    /// Digest of a ballot for `proposal_id`
    pub fn ballot_digest(&self, proposal_id: u64, support: Support) -> Hash {
        self.digest(&ballot_struct_hash(proposal_id, support))
    }

    /// Digest of a delegation authorization
    pub fn delegation_digest(
        &self,
        delegator: &Address,
        delegatee: &Address,
        nonce: u64,
        expiry: u64,
    ) -> Hash {
        self.digest(&delegation_struct_hash(delegator, delegatee, nonce, expiry))
    }
}

/// Struct hash of `Ballot(proposalId, support)`
pub fn ballot_struct_hash(proposal_id: u64, support: Support) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(sha256(BALLOT_TYPE_TAG));
    hasher.update(proposal_id.to_be_bytes());
    hasher.update([support.as_bool() as u8]);
    hasher.finalize().into()
}

/// Struct hash of `Delegation(delegator, delegatee, nonce, expiry)`
pub fn delegation_struct_hash(
    delegator: &Address,
    delegatee: &Address,
    nonce: u64,
    expiry: u64,
) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(sha256(DELEGATION_TYPE_TAG));
    hasher.update(delegator);
    hasher.update(delegatee);
    hasher.update(nonce.to_be_bytes());
    hasher.update(expiry.to_be_bytes());
    hasher.finalize().into()
}

/// Per-signer counters, each value consumable exactly once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct NonceTracker {
    nonces: BTreeMap<Address, u64>,
}

impl NonceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Next nonce `account` must sign
    pub fn current(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }

    /// Check `provided` is the next nonce without consuming it
    pub fn verify(&self, account: &Address, provided: u64) -> GovResult<()> {
        let expected = self.current(account);
        if provided != expected {
            return Err(GovError::InvalidNonce { expected, provided });
        }
        Ok(())
    }

    /// Consume `provided`, advancing the counter
    pub fn consume(&mut self, account: &Address, provided: u64) -> GovResult<()> {
        self.verify(account, provided)?;
        let next = provided.checked_add(1).ok_or(GovError::Overflow)?;
        self.nonces.insert(*account, next);
        Ok(())
    }
}

/// Deterministic signer for tests
///
/// A signature is `signer || H(tag || signer || digest)`; recovery yields the
/// signer only for the exact digest that was signed.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use crate::Vec;

    const TEST_SIGNER_TAG: &[u8] = b"ballot.test-signer";

    /// Test implementation of [`SignatureRecovery`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TestSigner;

    impl TestSigner {
        /// Sign `digest` as `signer`
        pub fn sign(signer: &Address, digest: &Hash) -> Signature {
            let mut bytes = Vec::with_capacity(64);
            bytes.extend_from_slice(signer);
            bytes.extend_from_slice(&Self::tag(signer, digest));
            Signature::new(bytes)
        }

        fn tag(signer: &Address, digest: &Hash) -> Hash {
            let mut hasher = Sha256::new();
            hasher.update(TEST_SIGNER_TAG);
            hasher.update(signer);
            hasher.update(digest);
            hasher.finalize().into()
        }
    }

    impl SignatureRecovery for TestSigner {
        fn recover(&self, digest: &Hash, signature: &Signature) -> Option<Address> {
            let bytes = signature.as_bytes();
            if bytes.len() != 64 {
                return None;
            }
            let mut signer = [0u8; 32];
            signer.copy_from_slice(&bytes[..32]);
            if bytes[32..] != Self::tag(&signer, digest) {
                return None;
            }
            Some(signer)
        }
    }
}
