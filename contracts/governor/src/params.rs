//! Governor Parameters
//!
//! Runtime-tunable settings, seeded from `constants::governance` and
//! checked against its bounds.

use ballot_common::{
    check,
    constants::governance::{
        MAX_OPERATIONS, MAX_OPERATIONS_CAP, MAX_VOTING_DELAY, MAX_VOTING_PERIOD,
        MIN_VOTING_PERIOD, PROPOSAL_THRESHOLD, QUORUM_PERCENT, VOTING_DELAY, VOTING_PERIOD,
    },
    errors::{GovError, GovResult},
    validation::require_in_range,
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct GovernorParams {
    /// Blocks between proposal creation and the opening of voting
    pub voting_delay: u64,
    /// Blocks the voting window stays open
    pub voting_period: u64,
    /// Prior votes required to propose
    pub proposal_threshold: u64,
    /// Participation required, in percent of prior total supply
    pub quorum_percent: u8,
    /// Maximum actions per proposal
    pub max_operations: usize,
}

impl Default for GovernorParams {
    fn default() -> Self {
        Self {
            voting_delay: VOTING_DELAY,
            voting_period: VOTING_PERIOD,
            proposal_threshold: PROPOSAL_THRESHOLD,
            quorum_percent: QUORUM_PERCENT,
            max_operations: MAX_OPERATIONS,
        }
    }
}

impl GovernorParams {
    pub fn validate(&self) -> GovResult<()> {
        require_in_range(self.voting_delay, 0, MAX_VOTING_DELAY, "voting_delay")?;
        require_in_range(
            self.voting_period,
            MIN_VOTING_PERIOD,
            MAX_VOTING_PERIOD,
            "voting_period",
        )?;
        require_in_range(self.quorum_percent as u64, 1, 100, "quorum_percent")?;
        check!(
            self.max_operations >= 1 && self.max_operations <= MAX_OPERATIONS_CAP,
            GovError::InvalidParameter {
                param: "max_operations",
                reason: "out of range",
            }
        );
        Ok(())
    }
}
