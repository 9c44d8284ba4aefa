//! Integration Tests for the Ballot Protocol
//!
//! Token, timelock and governor deployed together, sharing one block
//! counter, and driven through complete governance flows.

use crate::{Governor, GovernorParams, ProposalState};
use ballot_common::{
    constants::{
        governance::PROPOSAL_THRESHOLD,
        signing::DEFAULT_CHAIN_ID,
        timelock::{DEFAULT_DELAY, GRACE_PERIOD, SET_DELAY_SIGNATURE},
    },
    errors::GovError,
    events::EventType,
    signing::{selector, testing::TestSigner},
    types::{Address, CallContext, Support},
};
use ballot_timelock::{dispatch::testing::RecordingDispatcher, Timelock, TimelockTx};
use ballot_token::VotingToken;

// ============ Fixtures ============

const TOKEN: Address = [0xAA; 32];
const MINTER: Address = [0xEE; 32];
const TIMELOCK: Address = [0x71; 32];
const GOVERNOR: Address = [0x60; 32];
const GUARDIAN: Address = [0x90; 32];
const TARGET: Address = [0x33; 32];

fn alice() -> Address {
    [1u8; 32]
}

fn bob() -> Address {
    [2u8; 32]
}

fn carol() -> Address {
    [3u8; 32]
}

/// `n` times the proposal threshold, so fixtures hold under every network config
fn thresholds(n: u64) -> u64 {
    n * PROPOSAL_THRESHOLD
}

fn at(caller: Address, block: u64) -> CallContext {
    CallContext::new(caller, block)
}

/// All three contracts deployed, with the governor controlling the timelock
struct TestProtocol {
    token: VotingToken,
    timelock: Timelock,
    governor: Governor,
    dispatcher: RecordingDispatcher,
}

fn create_test_protocol(params: GovernorParams) -> TestProtocol {
    let token = VotingToken::new(TOKEN, MINTER, DEFAULT_CHAIN_ID).unwrap();
    let mut timelock = Timelock::new(TIMELOCK, GUARDIAN, DEFAULT_DELAY).unwrap();
    let mut governor = Governor::new(GOVERNOR, TIMELOCK, GUARDIAN, params, DEFAULT_CHAIN_ID).unwrap();

    timelock.set_pending_controller(&at(GUARDIAN, 0), GOVERNOR).unwrap();
    governor.accept_timelock_control(&at(GUARDIAN, 0), &mut timelock).unwrap();

    TestProtocol {
        token,
        timelock,
        governor,
        dispatcher: RecordingDispatcher::new(),
    }
}

impl TestProtocol {
    fn mint_and_self_delegate(&mut self, holder: Address, amount: u64, block: u64) {
        self.token.mint(&at(MINTER, block), holder, amount).unwrap();
        self.token.delegate(&at(holder, block), holder).unwrap();
    }

    fn propose_calls(&mut self, proposer: Address, block: u64, targets: Vec<Address>) -> Result<u64, GovError> {
        let n = targets.len();
        self.governor.propose(
            &at(proposer, block),
            &self.token,
            targets,
            vec![0; n],
            vec![String::from("ping(u64)"); n],
            vec![vec![7u8]; n],
            String::from("test proposal"),
        )
    }

    fn propose_ping(&mut self, proposer: Address, block: u64) -> u64 {
        self.propose_calls(proposer, block, vec![TARGET]).unwrap()
    }

    fn state(&self, id: u64, block: u64) -> ProposalState {
        self.governor.state(&self.token, id, block).unwrap()
    }

    fn vote(&mut self, voter: Address, id: u64, support: Support, block: u64) -> Result<u64, GovError> {
        self.governor.cast_vote(&at(voter, block), &self.token, id, support)
    }

    fn queue(&mut self, id: u64, block: u64) -> Result<u64, GovError> {
        self.governor.queue(&at(carol(), block), &self.token, &mut self.timelock, id)
    }

    fn execute(&mut self, id: u64, block: u64) -> Result<(), GovError> {
        self.governor.execute(
            &at(carol(), block),
            &self.token,
            &mut self.timelock,
            &mut self.dispatcher,
            id,
        )
    }

    fn cancel(&mut self, caller: Address, id: u64, block: u64) -> Result<(), GovError> {
        self.governor.cancel(&at(caller, block), &self.token, &mut self.timelock, id)
    }

    /// Propose at 2, vote for at start, return (id, end_block)
    fn passed_proposal(&mut self) -> (u64, u64) {
        self.mint_and_self_delegate(alice(), thresholds(10), 1);
        let id = self.propose_ping(alice(), 2);
        let proposal = self.governor.get_proposal(id).unwrap().clone();
        self.vote(alice(), id, Support::For, proposal.start_block).unwrap();
        (id, proposal.end_block)
    }
}

// ============ Proposal Lifecycle ============

#[test]
fn test_pending_then_active() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), PROPOSAL_THRESHOLD, 1);

    let id = protocol.propose_ping(alice(), 2);
    let start = protocol.governor.get_proposal(id).unwrap().start_block;

    assert_eq!(protocol.state(id, 2), ProposalState::Pending);
    assert_eq!(protocol.state(id, start), ProposalState::Active);
}

#[test]
fn test_full_lifecycle() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    let (id, end) = protocol.passed_proposal();

    assert_eq!(protocol.state(id, end - 1), ProposalState::Active);
    assert_eq!(protocol.state(id, end), ProposalState::Succeeded);

    let eta = protocol.queue(id, end).unwrap();
    assert_eq!(eta, end + DEFAULT_DELAY);
    assert_eq!(protocol.state(id, end), ProposalState::Queued);

    protocol.execute(id, eta).unwrap();
    assert_eq!(protocol.state(id, eta), ProposalState::Executed);

    let calls = protocol.dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, TARGET);
    assert_eq!(calls[0].payload[..4], selector("ping(u64)"));
    assert_eq!(calls[0].payload[4..], [7u8]);

    assert_eq!(protocol.governor.events().filter_by_type(EventType::ProposalExecuted).len(), 1);
    assert_eq!(protocol.timelock.events().filter_by_type(EventType::ExecuteTransaction).len(), 1);

    // executed proposals cannot run again
    assert_eq!(protocol.execute(id, eta + 1), Err(GovError::NotQueued));
}

#[test]
fn test_execute_window() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    let (id, end) = protocol.passed_proposal();
    let eta = protocol.queue(id, end).unwrap();

    assert!(matches!(
        protocol.execute(id, eta - 1),
        Err(GovError::DelayNotPassed { .. })
    ));
    assert_eq!(protocol.state(id, eta - 1), ProposalState::Queued);

    // the timelock alone enforces the grace period as Expired
    let tx = protocol.governor.get_proposal(id).unwrap().timelock_txs(eta).remove(0);
    let mut direct = protocol.timelock.clone();
    assert!(matches!(
        direct.execute(&at(GOVERNOR, eta + GRACE_PERIOD), &tx, &mut RecordingDispatcher::new()),
        Err(GovError::Expired { .. })
    ));

    // through the governor the proposal is Expired and no longer Queued
    assert_eq!(protocol.state(id, eta + GRACE_PERIOD), ProposalState::Expired);
    assert_eq!(protocol.execute(id, eta + GRACE_PERIOD), Err(GovError::NotQueued));

    protocol.execute(id, eta).unwrap();
}

#[test]
fn test_quorum_not_met_is_defeated() {
    let params = GovernorParams {
        quorum_percent: 30,
        ..Default::default()
    };
    let mut protocol = create_test_protocol(params);
    protocol.mint_and_self_delegate(alice(), thresholds(29), 1);
    protocol.mint_and_self_delegate(bob(), thresholds(71), 1);

    let id = protocol.propose_ping(alice(), 2);
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();
    assert_eq!(
        protocol.governor.quorum_votes(&protocol.token, proposal.snapshot_block(), 3).unwrap(),
        thresholds(30)
    );

    assert_eq!(
        protocol.vote(alice(), id, Support::For, proposal.start_block),
        Ok(thresholds(29))
    );
    assert_eq!(protocol.state(id, proposal.end_block), ProposalState::Defeated);
    assert!(matches!(
        protocol.queue(id, proposal.end_block),
        Err(GovError::MustBeSucceeded { .. })
    ));
}

#[test]
fn test_majority_against_is_defeated() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(4), 1);
    protocol.mint_and_self_delegate(bob(), thresholds(6), 1);

    let id = protocol.propose_ping(alice(), 2);
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();
    protocol.vote(alice(), id, Support::For, proposal.start_block).unwrap();
    protocol.vote(bob(), id, Support::Against, proposal.start_block).unwrap();

    assert_eq!(protocol.state(id, proposal.end_block), ProposalState::Defeated);
}

// ============ Voting ============

#[test]
fn test_vote_weight_frozen_at_snapshot() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    protocol.mint_and_self_delegate(bob(), thresholds(1), 1);

    let id = protocol.propose_ping(alice(), 2);
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();

    // alice hands bob most of her power once voting is open
    protocol
        .token
        .transfer(&at(alice(), proposal.start_block), bob(), thresholds(4))
        .unwrap();

    let bob_weight = protocol.vote(bob(), id, Support::For, proposal.end_block - 1).unwrap();
    let alice_weight = protocol.vote(alice(), id, Support::For, proposal.start_block + 1).unwrap();

    assert_eq!(bob_weight, thresholds(1));
    assert_eq!(alice_weight, thresholds(5));
    let receipt = protocol.governor.get_receipt(id, &bob()).unwrap().unwrap();
    assert_eq!(receipt.votes, thresholds(1));
    assert_eq!(receipt.support, Support::For);
}

#[test]
fn test_belated_delegation_does_not_count() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    protocol.token.mint(&at(MINTER, 1), bob(), thresholds(2)).unwrap();

    let id = protocol.propose_ping(alice(), 2);
    let start = protocol.governor.get_proposal(id).unwrap().start_block;

    // both hand their power to carol after the snapshot
    protocol.token.delegate(&at(bob(), start), carol()).unwrap();
    protocol.token.delegate(&at(alice(), start), carol()).unwrap();
    assert_eq!(protocol.token.current_votes(&carol()), thresholds(7));

    assert_eq!(protocol.vote(carol(), id, Support::Against, start + 1), Ok(0));
    assert_eq!(protocol.vote(bob(), id, Support::Against, start + 1), Ok(0));
    assert_eq!(protocol.vote(alice(), id, Support::For, start + 1), Ok(thresholds(5)));

    let proposal = protocol.governor.get_proposal(id).unwrap();
    assert_eq!(proposal.for_votes, thresholds(5));
    assert_eq!(proposal.against_votes, 0);
}

#[test]
fn test_vote_outside_window_and_twice() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    let id = protocol.propose_ping(alice(), 2);
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();

    assert_eq!(
        protocol.vote(alice(), id, Support::For, 2),
        Err(GovError::ProposalNotActive { proposal_id: id })
    );
    protocol.vote(alice(), id, Support::For, proposal.start_block).unwrap();
    assert!(matches!(
        protocol.vote(alice(), id, Support::Against, proposal.start_block + 1),
        Err(GovError::AlreadyVoted { .. })
    ));
    assert_eq!(
        protocol.vote(bob(), id, Support::For, proposal.end_block),
        Err(GovError::ProposalNotActive { proposal_id: id })
    );
    assert_eq!(protocol.governor.get_proposal(id).unwrap().against_votes, 0);
}

#[test]
fn test_cast_vote_by_sig_relayed() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    protocol.mint_and_self_delegate(bob(), thresholds(2), 1);
    let id = protocol.propose_ping(alice(), 2);
    let start = protocol.governor.get_proposal(id).unwrap().start_block;

    let digest = protocol.governor.domain().ballot_digest(id, Support::Against);
    let sig = TestSigner::sign(&bob(), &digest);

    // carol relays bob's ballot
    let weight = protocol
        .governor
        .cast_vote_by_sig(&at(carol(), start), &protocol.token, &TestSigner, id, Support::Against, &sig)
        .unwrap();
    assert_eq!(weight, thresholds(2));
    assert!(protocol.governor.get_receipt(id, &bob()).unwrap().is_some());
    assert!(protocol.governor.get_receipt(id, &carol()).unwrap().is_none());

    // a second relay of the same ballot is rejected
    let replay = protocol.governor.cast_vote_by_sig(
        &at(alice(), start + 1),
        &protocol.token,
        &TestSigner,
        id,
        Support::Against,
        &sig,
    );
    assert!(matches!(replay, Err(GovError::AlreadyVoted { .. })));

    // the ballot cannot be flipped to the other side
    let flipped = protocol.governor.cast_vote_by_sig(
        &at(carol(), start + 1),
        &protocol.token,
        &TestSigner,
        id,
        Support::For,
        &sig,
    );
    assert_eq!(flipped, Err(GovError::InvalidSignature));
}

#[test]
fn test_ballot_bound_to_governor_deployment() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    let id = protocol.propose_ping(alice(), 2);
    let start = protocol.governor.get_proposal(id).unwrap().start_block;

    let other = Governor::new([0x61; 32], TIMELOCK, GUARDIAN, GovernorParams::default(), DEFAULT_CHAIN_ID)
        .unwrap();
    let foreign = TestSigner::sign(&alice(), &other.domain().ballot_digest(id, Support::For));

    let result = protocol.governor.cast_vote_by_sig(
        &at(carol(), start),
        &protocol.token,
        &TestSigner,
        id,
        Support::For,
        &foreign,
    );
    assert_eq!(result, Err(GovError::InvalidSignature));
}

// ============ Proposer Rules ============

#[test]
fn test_single_live_proposal() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);

    let first = protocol.propose_ping(alice(), 2);
    let end = protocol.governor.get_proposal(first).unwrap().end_block;

    assert_eq!(
        protocol.propose_calls(alice(), 3, vec![TARGET]),
        Err(GovError::ProposerHasLiveProposal { live_proposal_id: first })
    );

    // no votes: Defeated at end, so a new proposal is accepted
    let second = protocol.propose_ping(alice(), end);
    assert_eq!(second, first + 1);
    assert_eq!(protocol.governor.latest_proposal_id(&alice()), Some(second));
}

#[test]
fn test_new_proposal_after_cancel_or_success() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);

    let canceled = protocol.propose_ping(alice(), 2);
    protocol.cancel(GUARDIAN, canceled, 3).unwrap();
    assert_eq!(protocol.state(canceled, 3), ProposalState::Canceled);

    let succeeded = protocol.propose_ping(alice(), 3);
    let proposal = protocol.governor.get_proposal(succeeded).unwrap().clone();
    protocol.vote(alice(), succeeded, Support::For, proposal.start_block).unwrap();
    assert_eq!(protocol.state(succeeded, proposal.end_block), ProposalState::Succeeded);

    let third = protocol.propose_ping(alice(), proposal.end_block);
    assert_eq!(third, succeeded + 1);
    assert_eq!(protocol.governor.latest_proposal_id(&alice()), Some(third));
}

#[test]
fn test_new_proposal_after_expiry() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    let (id, end) = protocol.passed_proposal();
    let eta = protocol.queue(id, end).unwrap();
    let expired_at = eta + GRACE_PERIOD;
    assert_eq!(protocol.state(id, expired_at), ProposalState::Expired);

    let next = protocol.propose_ping(alice(), expired_at);
    assert_eq!(next, id + 1);
    assert_eq!(protocol.state(next, expired_at), ProposalState::Pending);
}

#[test]
fn test_threshold_uses_prior_block() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 2);

    // power gained in the current block does not count yet
    assert!(matches!(
        protocol.propose_calls(alice(), 2, vec![TARGET]),
        Err(GovError::ThresholdNotMet { votes: 0, .. })
    ));
    assert!(protocol.propose_calls(alice(), 3, vec![TARGET]).is_ok());
}

// ============ Queue / Execute ============

#[test]
fn test_duplicate_action_cannot_queue() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(10), 1);
    let id = protocol.propose_calls(alice(), 2, vec![TARGET, TARGET]).unwrap();
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();
    protocol.vote(alice(), id, Support::For, proposal.start_block).unwrap();

    let result = protocol.queue(id, proposal.end_block);
    assert!(matches!(result, Err(GovError::AlreadyQueued { .. })));

    // nothing was written
    let tx = proposal.timelock_txs(proposal.end_block + DEFAULT_DELAY).remove(0);
    assert!(!protocol.timelock.is_queued(&tx.digest()));
    assert!(protocol.timelock.events().filter_by_type(EventType::QueueTransaction).is_empty());
    assert_eq!(protocol.state(id, proposal.end_block), ProposalState::Succeeded);
}

#[test]
fn test_failed_action_rolls_back_everything() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(10), 1);
    let reverting: Address = [0x44; 32];
    let id = protocol.propose_calls(alice(), 2, vec![TARGET, reverting]).unwrap();
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();
    protocol.vote(alice(), id, Support::For, proposal.start_block).unwrap();
    let eta = protocol.queue(id, proposal.end_block).unwrap();

    protocol.dispatcher.revert_on(reverting);
    let governor_events = protocol.governor.events().len();
    let timelock_before = protocol.timelock.clone();

    let result = protocol.execute(id, eta);
    assert!(matches!(result, Err(GovError::ExecutionReverted { .. })));

    assert!(protocol.dispatcher.calls().is_empty());
    assert_eq!(protocol.timelock, timelock_before);
    assert_eq!(protocol.governor.events().len(), governor_events);
    assert!(!protocol.governor.get_proposal(id).unwrap().executed);
    assert_eq!(protocol.state(id, eta), ProposalState::Queued);
}

#[test]
fn test_governance_changes_timelock_delay() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(10), 1);

    let id = protocol
        .governor
        .propose(
            &at(alice(), 2),
            &protocol.token,
            vec![TIMELOCK],
            vec![0],
            vec![String::from(SET_DELAY_SIGNATURE)],
            vec![borsh::to_vec(&(DEFAULT_DELAY * 2)).unwrap()],
            String::from("double the delay"),
        )
        .unwrap();
    let proposal = protocol.governor.get_proposal(id).unwrap().clone();
    protocol.vote(alice(), id, Support::For, proposal.start_block).unwrap();
    let eta = protocol.queue(id, proposal.end_block).unwrap();
    protocol.execute(id, eta).unwrap();

    assert_eq!(protocol.timelock.delay(), DEFAULT_DELAY * 2);
    assert!(protocol.dispatcher.calls().is_empty());
}

// ============ Cancel ============

#[test]
fn test_guardian_cancels_queued_proposal() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    let (id, end) = protocol.passed_proposal();
    let eta = protocol.queue(id, end).unwrap();
    let tx: TimelockTx = protocol.governor.get_proposal(id).unwrap().timelock_txs(eta).remove(0);
    assert!(protocol.timelock.is_queued(&tx.digest()));

    assert!(matches!(
        protocol.cancel(alice(), id, end + 1),
        Err(GovError::MustBeGuardian { .. })
    ));
    protocol.cancel(GUARDIAN, id, end + 1).unwrap();

    assert_eq!(protocol.state(id, end + 1), ProposalState::Canceled);
    assert!(!protocol.timelock.is_queued(&tx.digest()));
    assert_eq!(
        protocol.cancel(GUARDIAN, id, end + 2),
        Err(GovError::CannotCancel { proposal_id: id })
    );
    assert_eq!(protocol.execute(id, eta), Err(GovError::NotQueued));
}

#[test]
fn test_cannot_cancel_executed() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    let (id, end) = protocol.passed_proposal();
    let eta = protocol.queue(id, end).unwrap();
    protocol.execute(id, eta).unwrap();

    assert_eq!(
        protocol.cancel(GUARDIAN, id, eta + 1),
        Err(GovError::CannotCancel { proposal_id: id })
    );
}

#[test]
fn test_cancel_pending_and_idempotent_timelock_cancel() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    let id = protocol.propose_ping(alice(), 2);

    protocol.cancel(GUARDIAN, id, 2).unwrap();
    assert_eq!(protocol.state(id, 2), ProposalState::Canceled);
    // never queued, so the timelock saw nothing
    assert!(protocol.timelock.events().filter_by_type(EventType::CancelTransaction).is_empty());

    // canceling an entry that was never queued is a no-op
    let tx = protocol.governor.get_proposal(id).unwrap().timelock_txs(50).remove(0);
    protocol.timelock.cancel(&at(GOVERNOR, 3), &tx).unwrap();
    protocol.timelock.cancel(&at(GOVERNOR, 4), &tx).unwrap();
    assert!(!protocol.timelock.is_queued(&tx.digest()));
}

#[test]
fn test_abdicated_guardian_cannot_cancel() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), thresholds(5), 1);
    let id = protocol.propose_ping(alice(), 2);

    protocol.governor.abdicate(&at(GUARDIAN, 3)).unwrap();
    assert!(matches!(
        protocol.cancel(GUARDIAN, id, 3),
        Err(GovError::MustBeGuardian { .. })
    ));
}

#[test]
fn test_timelock_control_cannot_move_again() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    assert_eq!(protocol.timelock.controller(), GOVERNOR);
    assert_eq!(
        protocol.timelock.set_pending_controller(&at(GOVERNOR, 1), GUARDIAN),
        Err(GovError::ControlAlreadyTransferred)
    );
    // the deployer lost its access
    let tx = TimelockTx {
        proposal_id: 9,
        target: TARGET,
        value: 0,
        signature: String::new(),
        calldata: vec![],
        eta: 100,
    };
    assert!(matches!(
        protocol.timelock.enqueue(&at(GUARDIAN, 1), &tx),
        Err(GovError::Unauthorized { .. })
    ));
}

// ============ Checkpoint Properties ============

#[test]
fn test_transfer_between_delegates_history() {
    let mut protocol = create_test_protocol(GovernorParams::default());
    protocol.mint_and_self_delegate(alice(), 1_000, 1);
    protocol.token.delegate(&at(bob(), 1), bob()).unwrap();

    protocol.token.transfer(&at(alice(), 2), bob(), 500).unwrap();

    let token = &protocol.token;
    assert_eq!(token.prior_votes(&alice(), 1, 3).unwrap(), 1_000);
    assert_eq!(token.prior_votes(&alice(), 2, 3).unwrap(), 500);
    assert_eq!(token.prior_votes(&bob(), 1, 3).unwrap(), 0);
    assert_eq!(token.prior_votes(&bob(), 2, 3).unwrap(), 500);
    assert!(matches!(
        token.prior_votes(&alice(), 3, 3),
        Err(GovError::BlockNotYetMined { .. })
    ));
}

/// Deterministic linear congruential generator
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

#[test]
fn test_conservation_under_random_activity() {
    let mut token = VotingToken::new(TOKEN, MINTER, DEFAULT_CHAIN_ID).unwrap();
    let accounts: Vec<Address> = (1..=6u8).map(|i| [i; 32]).collect();
    let mut rng = Lcg(0x5EED);

    for (i, account) in accounts.iter().enumerate() {
        token.mint(&at(MINTER, 1), *account, 1_000 * (i as u64 + 1)).unwrap();
        token.delegate(&at(*account, 1), *account).unwrap();
    }

    let last_block = 60u64;
    for block in 2..last_block {
        for _ in 0..4 {
            let actor = accounts[rng.below(accounts.len() as u64) as usize];
            let other = accounts[rng.below(accounts.len() as u64) as usize];
            match rng.below(4) {
                0 => {
                    let balance = token.balance_of(&actor);
                    if balance > 0 {
                        let amount = rng.below(balance) + 1;
                        token.transfer(&at(actor, block), other, amount).unwrap();
                    }
                }
                1 => token.delegate(&at(actor, block), other).unwrap(),
                2 => token.mint(&at(MINTER, block), actor, rng.below(500) + 1).unwrap(),
                _ => {
                    let balance = token.balance_of(&actor);
                    if balance > 0 {
                        token.burn(&at(actor, block), rng.below(balance) + 1).unwrap();
                    }
                }
            }
        }

        // everyone always has a delegatee, so delegated power equals supply
        let delegated: u64 = accounts.iter().map(|a| token.current_votes(a)).sum();
        let balances: u64 = accounts.iter().map(|a| token.balance_of(a)).sum();
        assert_eq!(delegated, token.total_supply());
        assert_eq!(balances, token.total_supply());
    }

    for block in 1..last_block {
        let delegated = token.ledger().delegated_total_at(block, last_block).unwrap();
        let supply = token.ledger().total_at(block, last_block).unwrap();
        assert_eq!(delegated, supply as u128, "conservation broken at block {block}");
    }

    for account in &accounts {
        let history = token.ledger().history(account).unwrap();
        assert!(history
            .as_slice()
            .windows(2)
            .all(|w| w[0].from_block < w[1].from_block));
    }
}
