//! Ballot Voting Token
//!
//! Fungible governance token whose balances carry voting power. Holders
//! choose a delegatee; every balance movement and delegation change updates
//! the delegatees' checkpoint histories, which the governor reads through
//! [`VotingPowerSource`].
//!
//! Only the authorized minter can mint. Holders burn their own balance.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub mod delegation;

pub use delegation::{BalanceChangeOutcome, DelegationOutcome, DelegationRegistry, VoteChange};

use ballot_common::{
    check,
    checkpoints::{Checkpoint, CheckpointLedger, VotingPowerSource},
    constants::token,
    errors::{GovError, GovResult},
    events::{EventLog, GovEvent},
    math,
    signing::{DomainSeparator, NonceTracker, SignatureRecovery},
    types::{is_zero_address, Address, CallContext, Signature},
    validation::{require_positive, require_sufficient_balance, require_valid_address},
    BTreeMap, Vec,
};

// ============ Token State ============

/// Voting token state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VotingToken {
    /// Address of this token contract
    pub address: Address,
    /// Account allowed to mint
    pub authorized_minter: Address,
    balances: BTreeMap<Address, u64>,
    registry: DelegationRegistry,
    ledger: CheckpointLedger,
    nonces: NonceTracker,
    domain: DomainSeparator,
    #[serde(skip)]
    #[borsh(skip)]
    events: EventLog,
}

// No Default: a token always needs an explicit, non-zero minter.

impl VotingToken {
    /// Deploy a token at `address` with `authorized_minter`
    pub fn new(address: Address, authorized_minter: Address, chain_id: u64) -> GovResult<Self> {
        require_valid_address(&address, "token address is zero")?;
        require_valid_address(&authorized_minter, "minter is zero")?;

        Ok(Self {
            address,
            authorized_minter,
            balances: BTreeMap::new(),
            registry: DelegationRegistry::new(),
            ledger: CheckpointLedger::new(),
            nonces: NonceTracker::new(),
            domain: DomainSeparator::new(token::NAME, chain_id, address),
            events: EventLog::new(),
        })
    }

    /// Get token name
    pub fn name() -> &'static str {
        token::NAME
    }

    /// Get token symbol
    pub fn symbol() -> &'static str {
        token::SYMBOL
    }

    /// Get token decimals
    pub fn decimals() -> u8 {
        token::DECIMALS
    }

    // ============ Balances ============

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.latest_total()
    }

    /// Move `amount` from the caller to `to`
    pub fn transfer(&mut self, ctx: &CallContext, to: Address, amount: u64) -> GovResult<()> {
        let from = ctx.caller;
        require_valid_address(&from, "transfer from zero address")?;
        require_valid_address(&to, "transfer to zero address")?;
        require_positive(amount)?;

        let from_balance = self.balance_of(&from);
        require_sufficient_balance(from_balance, amount)?;
        let new_from = math::sub(from_balance, amount)?;
        let new_to = if from == to {
            from_balance
        } else {
            math::add(self.balance_of(&to), amount)?
        };

        let outcome = self.registry.on_balance_change(
            &mut self.ledger,
            Some(from),
            Some(to),
            amount,
            ctx.block_height,
        )?;

        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);

        self.events.emit(GovEvent::Transfer {
            from: Some(from),
            to: Some(to),
            amount,
            block_height: ctx.block_height,
        });
        self.emit_vote_changes(&outcome.vote_changes, ctx.block_height);
        Ok(())
    }

    /// Create `amount` new tokens for `to` (authorized minter only)
    pub fn mint(&mut self, ctx: &CallContext, to: Address, amount: u64) -> GovResult<()> {
        check!(
            ctx.caller == self.authorized_minter,
            GovError::MintUnauthorized { caller: ctx.caller }
        );
        require_valid_address(&to, "mint to zero address")?;
        require_positive(amount)?;

        let new_supply = math::add(self.total_supply(), amount)?;
        check!(
            new_supply <= token::MAX_SUPPLY,
            GovError::ExceedsMaximum {
                amount: new_supply,
                maximum: token::MAX_SUPPLY,
            }
        );
        let new_balance = math::add(self.balance_of(&to), amount)?;

        let outcome = self.registry.on_balance_change(
            &mut self.ledger,
            None,
            Some(to),
            amount,
            ctx.block_height,
        )?;
        self.balances.insert(to, new_balance);

        self.events.emit(GovEvent::Transfer {
            from: None,
            to: Some(to),
            amount,
            block_height: ctx.block_height,
        });
        self.emit_vote_changes(&outcome.vote_changes, ctx.block_height);
        Ok(())
    }

    /// Destroy `amount` of the caller's tokens
    pub fn burn(&mut self, ctx: &CallContext, amount: u64) -> GovResult<()> {
        let from = ctx.caller;
        require_positive(amount)?;
        let balance = self.balance_of(&from);
        require_sufficient_balance(balance, amount)?;
        let new_balance = math::sub(balance, amount)?;

        let outcome = self.registry.on_balance_change(
            &mut self.ledger,
            Some(from),
            None,
            amount,
            ctx.block_height,
        )?;
        if new_balance == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, new_balance);
        }

        self.events.emit(GovEvent::Transfer {
            from: Some(from),
            to: None,
            amount,
            block_height: ctx.block_height,
        });
        self.emit_vote_changes(&outcome.vote_changes, ctx.block_height);
        Ok(())
    }

    // ============ Delegation ============

    /// Delegate the caller's voting power to `delegatee` (zero address revokes)
    pub fn delegate(&mut self, ctx: &CallContext, delegatee: Address) -> GovResult<()> {
        self.delegate_from(ctx.caller, delegatee, ctx.block_height)
    }

    /// Delegate on behalf of `delegator` using a signed authorization
    ///
    /// The signature covers `(delegator, delegatee, nonce, expiry)` under
    /// this token's domain. A successful call consumes the nonce.
    #[allow(clippy::too_many_arguments)]
    pub fn delegate_by_sig<R: SignatureRecovery>(
        &mut self,
        ctx: &CallContext,
        recovery: &R,
        delegator: Address,
        delegatee: Address,
        nonce: u64,
        expiry: u64,
        signature: &Signature,
    ) -> GovResult<()> {
        let digest = self.domain.delegation_digest(&delegator, &delegatee, nonce, expiry);
        let signer = recovery
            .recover(&digest, signature)
            .filter(|signer| !is_zero_address(signer))
            .ok_or(GovError::InvalidSignature)?;

        check!(
            signer == delegator,
            GovError::SignerMismatch {
                expected: delegator,
                recovered: signer,
            }
        );
        check!(
            ctx.block_height <= expiry,
            GovError::SignatureExpired {
                expiry,
                current_block: ctx.block_height,
            }
        );
        self.nonces.verify(&signer, nonce)?;
        check!(nonce < u64::MAX, GovError::Overflow);

        self.delegate_from(signer, delegatee, ctx.block_height)?;
        self.nonces.consume(&signer, nonce)
    }

    fn delegate_from(&mut self, delegator: Address, delegatee: Address, block: u64) -> GovResult<()> {
        let balance = self.balance_of(&delegator);
        let outcome = self
            .registry
            .delegate(&mut self.ledger, delegator, delegatee, balance, block)?;

        self.events.emit(GovEvent::DelegateChanged {
            delegator,
            from_delegate: outcome.from_delegate,
            to_delegate: outcome.to_delegate,
            block_height: block,
        });
        self.emit_vote_changes(&outcome.vote_changes, block);
        Ok(())
    }

    fn emit_vote_changes(&mut self, changes: &[VoteChange], block: u64) {
        for change in changes {
            self.events.emit(GovEvent::DelegateVotesChanged {
                delegate: change.delegate,
                previous_votes: change.previous_votes,
                new_votes: change.new_votes,
                block_height: block,
            });
        }
    }

    // ============ Views ============

    /// Current delegatee of `account`
    pub fn delegates(&self, account: &Address) -> Option<Address> {
        self.registry.delegatee(account)
    }

    /// Votes currently delegated to `account`
    pub fn current_votes(&self, account: &Address) -> u64 {
        self.ledger.latest_value(account)
    }

    /// Votes delegated to `account` as of `block` (strictly before `current_block`)
    pub fn prior_votes(&self, account: &Address, block: u64, current_block: u64) -> GovResult<u64> {
        self.ledger.value_at(account, block, current_block)
    }

    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.ledger.num_checkpoints(account)
    }

    pub fn checkpoint(&self, account: &Address, index: usize) -> Option<Checkpoint> {
        self.ledger.checkpoint(account, index)
    }

    /// Next delegation nonce for `account`
    pub fn nonces(&self, account: &Address) -> u64 {
        self.nonces.current(account)
    }

    /// Signing domain of delegation authorizations
    pub fn domain(&self) -> &DomainSeparator {
        &self.domain
    }

    /// Checkpoint histories
    pub fn ledger(&self) -> &CheckpointLedger {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Take the emitted events, leaving the log empty
    pub fn take_events(&mut self) -> Vec<GovEvent> {
        self.events.drain()
    }

    // ============ Persistence ============

    /// Serialize persistent state (events are not persisted)
    pub fn to_bytes(&self) -> GovResult<Vec<u8>> {
        borsh::to_vec(self).map_err(|_| GovError::InvariantViolation {
            reason: "token state serialization failed",
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> GovResult<Self> {
        borsh::from_slice(bytes).map_err(|_| GovError::InvalidParameter {
            param: "token_state",
            reason: "malformed encoding",
        })
    }
}

impl VotingPowerSource for VotingToken {
    fn prior_votes(&self, account: &Address, block: u64, current_block: u64) -> GovResult<u64> {
        self.ledger.value_at(account, block, current_block)
    }

    fn prior_total_supply(&self, block: u64, current_block: u64) -> GovResult<u64> {
        self.ledger.total_at(block, current_block)
    }
}

/// Format amount for display as (whole, fractional)
pub fn format_amount(amount: u64) -> (u64, u64) {
    (amount / token::ONE, amount % token::ONE)
}

// ============ Tests ============
