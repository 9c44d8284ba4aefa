//! Ballot Governor
//!
//! Proposal state machine for the Ballot protocol. Token holders with enough
//! delegated votes propose batches of calls; votes are weighted by voting
//! power as of the block before voting opens; successful proposals are
//! queued in the timelock and executed there once the delay has passed.
//!
//! ## Lifecycle
//!
//! ```text
//! propose -> Pending -> Active -> Succeeded -> queue -> Queued -> execute -> Executed
//!                                \-> Defeated           \-> Expired
//! guardian cancel -> Canceled (from any state but Executed)
//! ```
//!
//! The governor reads voting power through [`VotingPowerSource`] and drives
//! the [`Timelock`], whose controller it must be. Every operation either
//! completes or leaves all three of governor, timelock and dispatcher as
//! they were.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub mod params;
pub mod proposal;

#[cfg(test)]
mod integration_tests;

pub use params::GovernorParams;
pub use proposal::{Action, Proposal, ProposalState, Receipt};

use ballot_common::{
    check,
    checkpoints::VotingPowerSource,
    constants::signing::GOVERNOR_NAME,
    errors::{GovError, GovResult},
    events::{EventLog, GovEvent},
    math,
    signing::{DomainSeparator, SignatureRecovery},
    types::{is_zero_address, Address, CallContext, Signature, Support},
    validation::require_valid_address,
    BTreeMap, BTreeSet, String, Vec,
};
use ballot_timelock::{CallDispatcher, Timelock};

// ============ Governor State ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Governor {
    /// Address of this governor
    pub address: Address,
    /// Timelock this governor controls
    pub timelock_address: Address,
    guardian: Option<Address>,
    params: GovernorParams,
    proposal_count: u64,
    proposals: BTreeMap<u64, Proposal>,
    latest_proposal_ids: BTreeMap<Address, u64>,
    domain: DomainSeparator,
    #[serde(skip)]
    #[borsh(skip)]
    events: EventLog,
}

impl Governor {
    /// Deploy a governor
    pub fn new(
        address: Address,
        timelock_address: Address,
        guardian: Address,
        params: GovernorParams,
        chain_id: u64,
    ) -> GovResult<Self> {
        require_valid_address(&address, "governor address is zero")?;
        require_valid_address(&timelock_address, "timelock address is zero")?;
        require_valid_address(&guardian, "guardian is zero")?;
        params.validate()?;

        Ok(Self {
            address,
            timelock_address,
            guardian: Some(guardian),
            params,
            proposal_count: 0,
            proposals: BTreeMap::new(),
            latest_proposal_ids: BTreeMap::new(),
            domain: DomainSeparator::new(GOVERNOR_NAME, chain_id, address),
            events: EventLog::new(),
        })
    }

    // ============ Proposals ============

    /// Create a proposal from four parallel lists; returns its id
    #[allow(clippy::too_many_arguments)]
    pub fn propose<V: VotingPowerSource>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        targets: Vec<Address>,
        values: Vec<u64>,
        signatures: Vec<String>,
        calldatas: Vec<Vec<u8>>,
        description: String,
    ) -> GovResult<u64> {
        let now = ctx.block_height;
        let proposer = ctx.caller;

        let prior_block = now.checked_sub(1).ok_or(GovError::BlockNotYetMined {
            block: 0,
            current_block: now,
        })?;
        let proposer_votes = votes.prior_votes(&proposer, prior_block, now)?;
        check!(
            proposer_votes >= self.params.proposal_threshold,
            GovError::ThresholdNotMet {
                votes: proposer_votes,
                threshold: self.params.proposal_threshold,
            }
        );

        let count = targets.len();
        check!(
            count > 0 && count <= self.params.max_operations,
            GovError::InvalidActionCount {
                count,
                maximum: self.params.max_operations,
            }
        );
        check!(
            values.len() == count && signatures.len() == count && calldatas.len() == count,
            GovError::ArrayLengthMismatch
        );

        if let Some(&live_id) = self.latest_proposal_ids.get(&proposer) {
            let live_state = self.state(votes, live_id, now)?;
            check!(
                !live_state.is_live(),
                GovError::ProposerHasLiveProposal {
                    live_proposal_id: live_id,
                }
            );
        }

        let start_block = math::add(now, self.params.voting_delay)?;
        let end_block = math::add(start_block, self.params.voting_period)?;
        let id = math::add(self.proposal_count, 1)?;

        let actions: Vec<Action> = targets
            .iter()
            .zip(values)
            .zip(signatures)
            .zip(calldatas)
            .map(|(((target, value), signature), calldata)| Action {
                target: *target,
                value,
                signature,
                calldata,
            })
            .collect();

        self.proposal_count = id;
        self.proposals
            .insert(
                id,
                Proposal::new(id, proposer, description.clone(), actions, start_block, end_block),
            );
        self.latest_proposal_ids.insert(proposer, id);

        self.events.emit(GovEvent::ProposalCreated {
            proposal_id: id,
            proposer,
            targets,
            start_block,
            end_block,
            description,
            block_height: now,
        });
        Ok(id)
    }

    /// Derived state of `proposal_id` at block `now`
    pub fn state<V: VotingPowerSource>(
        &self,
        votes: &V,
        proposal_id: u64,
        now: u64,
    ) -> GovResult<ProposalState> {
        let proposal = self.get_proposal(proposal_id)?;
        if let Some(state) = proposal.voting_state(now) {
            return Ok(state);
        }
        let quorum = self.quorum_votes(votes, proposal.snapshot_block(), now)?;
        Ok(proposal.settled_state(now, quorum))
    }

    // ============ Voting ============

    /// Vote as the caller; returns the weight counted
    pub fn cast_vote<V: VotingPowerSource>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        proposal_id: u64,
        support: Support,
    ) -> GovResult<u64> {
        self.record_vote(ctx, votes, ctx.caller, proposal_id, support)
    }

    /// Vote on behalf of the signer of a ballot
    ///
    /// The ballot binds `(proposal_id, support)` and this governor's domain,
    /// not the relayer. Replays fail with `AlreadyVoted`.
    pub fn cast_vote_by_sig<V: VotingPowerSource, R: SignatureRecovery>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        recovery: &R,
        proposal_id: u64,
        support: Support,
        signature: &Signature,
    ) -> GovResult<u64> {
        let digest = self.domain.ballot_digest(proposal_id, support);
        let voter = recovery
            .recover(&digest, signature)
            .filter(|signer| !is_zero_address(signer))
            .ok_or(GovError::InvalidSignature)?;
        self.record_vote(ctx, votes, voter, proposal_id, support)
    }

    fn record_vote<V: VotingPowerSource>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        voter: Address,
        proposal_id: u64,
        support: Support,
    ) -> GovResult<u64> {
        let now = ctx.block_height;
        let state = self.state(votes, proposal_id, now)?;
        check!(
            state == ProposalState::Active,
            GovError::ProposalNotActive { proposal_id }
        );

        let proposal = self.get_proposal(proposal_id)?;
        check!(
            !proposal.has_voted(&voter),
            GovError::AlreadyVoted { proposal_id, voter }
        );
        let weight = votes.prior_votes(&voter, proposal.snapshot_block(), now)?;

        self.get_proposal_mut(proposal_id)?
            .record_vote(voter, support, weight)?;

        self.events.emit(GovEvent::VoteCast {
            voter,
            proposal_id,
            support,
            votes: weight,
            block_height: now,
        });
        Ok(weight)
    }

    // ============ Timelock Integration ============

    /// Queue a succeeded proposal's actions; returns the eta
    pub fn queue<V: VotingPowerSource>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        timelock: &mut Timelock,
        proposal_id: u64,
    ) -> GovResult<u64> {
        self.require_timelock(timelock)?;
        let now = ctx.block_height;
        let state = self.state(votes, proposal_id, now)?;
        check!(
            state == ProposalState::Succeeded,
            GovError::MustBeSucceeded { proposal_id }
        );

        let eta = math::add(now, timelock.delay())?;
        let txs = self.get_proposal(proposal_id)?.timelock_txs(eta);

        let mut seen = BTreeSet::new();
        for tx in &txs {
            let digest = tx.digest();
            check!(
                !timelock.is_queued(&digest) && seen.insert(digest),
                GovError::AlreadyQueued { digest }
            );
        }

        let snapshot = timelock.clone();
        let as_governor = ctx.as_caller(self.address);
        for tx in &txs {
            if let Err(err) = timelock.enqueue(&as_governor, tx) {
                *timelock = snapshot;
                return Err(err);
            }
        }

        self.get_proposal_mut(proposal_id)?.eta = eta;
        self.events.emit(GovEvent::ProposalQueued {
            proposal_id,
            eta,
            block_height: now,
        });
        Ok(eta)
    }

    /// Execute every action of a queued proposal, all or nothing
    pub fn execute<V: VotingPowerSource, D: CallDispatcher>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        timelock: &mut Timelock,
        dispatcher: &mut D,
        proposal_id: u64,
    ) -> GovResult<()> {
        self.require_timelock(timelock)?;
        let now = ctx.block_height;
        let state = self.state(votes, proposal_id, now)?;
        check!(state == ProposalState::Queued, GovError::NotQueued);

        let proposal = self.get_proposal(proposal_id)?;
        let txs = proposal.timelock_txs(proposal.eta);

        let timelock_snapshot = timelock.clone();
        let savepoint = dispatcher.savepoint();
        let mark = self.events.mark();

        // executed is set before any call goes out
        self.get_proposal_mut(proposal_id)?.executed = true;

        let as_governor = ctx.as_caller(self.address);
        for tx in &txs {
            if let Err(err) = timelock.execute(&as_governor, tx, dispatcher) {
                *timelock = timelock_snapshot;
                dispatcher.rollback_to(savepoint);
                self.events.rollback_to(mark);
                self.get_proposal_mut(proposal_id)?.executed = false;
                return Err(err);
            }
        }

        self.events.emit(GovEvent::ProposalExecuted {
            proposal_id,
            block_height: now,
        });
        Ok(())
    }

    /// Cancel a proposal (guardian only)
    pub fn cancel<V: VotingPowerSource>(
        &mut self,
        ctx: &CallContext,
        votes: &V,
        timelock: &mut Timelock,
        proposal_id: u64,
    ) -> GovResult<()> {
        self.require_guardian(ctx)?;
        self.require_timelock(timelock)?;
        let now = ctx.block_height;
        let state = self.state(votes, proposal_id, now)?;
        check!(
            !matches!(state, ProposalState::Executed | ProposalState::Canceled),
            GovError::CannotCancel { proposal_id }
        );

        let proposal = self.get_proposal(proposal_id)?;
        if proposal.eta != 0 {
            let txs = proposal.timelock_txs(proposal.eta);
            let snapshot = timelock.clone();
            let as_governor = ctx.as_caller(self.address);
            for tx in &txs {
                if let Err(err) = timelock.cancel(&as_governor, tx) {
                    *timelock = snapshot;
                    return Err(err);
                }
            }
        }

        self.get_proposal_mut(proposal_id)?.canceled = true;
        self.events.emit(GovEvent::ProposalCanceled {
            proposal_id,
            block_height: now,
        });
        Ok(())
    }

    // ============ Guardian ============

    /// Accept the pending controller role on the timelock
    pub fn accept_timelock_control(&mut self, ctx: &CallContext, timelock: &mut Timelock) -> GovResult<()> {
        self.require_guardian(ctx)?;
        self.require_timelock(timelock)?;
        timelock.accept_controller(&ctx.as_caller(self.address))
    }

    /// Give up the guardian role for good
    pub fn abdicate(&mut self, ctx: &CallContext) -> GovResult<()> {
        self.require_guardian(ctx)?;
        self.guardian = None;
        self.events.emit(GovEvent::GuardianAbdicated {
            guardian: ctx.caller,
            block_height: ctx.block_height,
        });
        Ok(())
    }

    fn require_guardian(&self, ctx: &CallContext) -> GovResult<()> {
        check!(
            self.guardian == Some(ctx.caller),
            GovError::MustBeGuardian { caller: ctx.caller }
        );
        Ok(())
    }

    fn require_timelock(&self, timelock: &Timelock) -> GovResult<()> {
        check!(
            timelock.address == self.timelock_address,
            GovError::InvalidAddress {
                reason: "not this governor's timelock",
            }
        );
        Ok(())
    }

    // ============ Views ============

    /// Votes needed for quorum, measured against total supply at `block`
    pub fn quorum_votes<V: VotingPowerSource>(&self, votes: &V, block: u64, now: u64) -> GovResult<u64> {
        let supply = votes.prior_total_supply(block, now)?;
        Ok(math::percent_of(supply, self.params.quorum_percent))
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    /// Most recent proposal created by `proposer`
    pub fn latest_proposal_id(&self, proposer: &Address) -> Option<u64> {
        self.latest_proposal_ids.get(proposer).copied()
    }

    pub fn get_proposal(&self, proposal_id: u64) -> GovResult<&Proposal> {
        check!(
            proposal_id != 0 && proposal_id <= self.proposal_count,
            GovError::InvalidProposalId { proposal_id }
        );
        self.proposals
            .get(&proposal_id)
            .ok_or(GovError::InvalidProposalId { proposal_id })
    }

    fn get_proposal_mut(&mut self, proposal_id: u64) -> GovResult<&mut Proposal> {
        self.proposals
            .get_mut(&proposal_id)
            .ok_or(GovError::InvalidProposalId { proposal_id })
    }

    pub fn get_actions(&self, proposal_id: u64) -> GovResult<&[Action]> {
        Ok(&self.get_proposal(proposal_id)?.actions)
    }

    pub fn get_receipt(&self, proposal_id: u64, voter: &Address) -> GovResult<Option<Receipt>> {
        Ok(self.get_proposal(proposal_id)?.receipt(voter))
    }

    pub fn params(&self) -> &GovernorParams {
        &self.params
    }

    pub fn guardian(&self) -> Option<Address> {
        self.guardian
    }

    /// Signing domain of ballots
    pub fn domain(&self) -> &DomainSeparator {
        &self.domain
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GovEvent> {
        self.events.drain()
    }
}
