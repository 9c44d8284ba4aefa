//! Protocol Constants
//!
//! Configuration values for the Ballot governance contracts. Durations are
//! measured in blocks of the shared block counter.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production durations (days-long voting and timelock windows)
//! - Default (no feature) - Testnet values (short windows for testing)
//!
//! ```toml
//! # For mainnet deployment:
//! ballot-common = { path = "...", features = ["mainnet"] }
//! ```

/// Token Metadata
pub mod token {
    /// Token name, also used as the token's signing domain name
    pub const NAME: &str = "Ballot";
    /// Token symbol
    pub const SYMBOL: &str = "BLT";
    /// Decimal places
    pub const DECIMALS: u8 = 8;
    /// One whole token in base units
    pub const ONE: u64 = 100_000_000;
    /// Maximum supply (10 billion tokens, fits in u64 with headroom)
    pub const MAX_SUPPLY: u64 = 10_000_000_000 * ONE;
}

/// Time-related constants
pub mod time {
    /// Blocks per day (assuming 12 second blocks)
    pub const BLOCKS_PER_DAY: u64 = 7_200;
}

/// Governor defaults and bounds
///
/// Defaults seed the governor's runtime parameters; bounds are enforced
/// when parameters are validated.
pub mod governance {
    use super::time::BLOCKS_PER_DAY;
    #[cfg(feature = "mainnet")]
    use super::token::ONE;

    /// Blocks between proposal creation and the opening of voting
    pub const VOTING_DELAY: u64 = 1;

    /// Maximum configurable voting delay (~1 week)
    pub const MAX_VOTING_DELAY: u64 = 7 * BLOCKS_PER_DAY;

    /// Length of the voting window
    /// - Mainnet: ~3 days
    /// - Testnet: 20 blocks
    #[cfg(feature = "mainnet")]
    pub const VOTING_PERIOD: u64 = 3 * BLOCKS_PER_DAY;
    #[cfg(not(feature = "mainnet"))]
    pub const VOTING_PERIOD: u64 = 20;

    /// Shortest configurable voting window
    /// - Mainnet: ~1 day
    /// - Testnet: 1 block
    #[cfg(feature = "mainnet")]
    pub const MIN_VOTING_PERIOD: u64 = BLOCKS_PER_DAY;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_VOTING_PERIOD: u64 = 1;

    /// Longest configurable voting window (~2 weeks)
    pub const MAX_VOTING_PERIOD: u64 = 14 * BLOCKS_PER_DAY;

    /// Votes required (as of the block before creation) to propose
    /// - Mainnet: 100,000 tokens
    /// - Testnet: 1,000 base units
    #[cfg(feature = "mainnet")]
    pub const PROPOSAL_THRESHOLD: u64 = 100_000 * ONE;
    #[cfg(not(feature = "mainnet"))]
    pub const PROPOSAL_THRESHOLD: u64 = 1_000;

    /// Participation required, as a percentage of total supply at `start_block - 1`
    pub const QUORUM_PERCENT: u8 = 4;

    /// Default maximum number of actions per proposal
    pub const MAX_OPERATIONS: usize = 10;

    /// Hard cap on the configurable action count
    pub const MAX_OPERATIONS_CAP: usize = 50;
}

/// Timelock Configuration
pub mod timelock {
    use super::time::BLOCKS_PER_DAY;

    /// Window after `eta` during which a queued transaction may execute
    /// - Mainnet: ~14 days
    /// - Testnet: 100 blocks
    #[cfg(feature = "mainnet")]
    pub const GRACE_PERIOD: u64 = 14 * BLOCKS_PER_DAY;
    #[cfg(not(feature = "mainnet"))]
    pub const GRACE_PERIOD: u64 = 100;

    /// Minimum configurable delay
    /// - Mainnet: ~2 days
    /// - Testnet: 1 block
    #[cfg(feature = "mainnet")]
    pub const MIN_DELAY: u64 = 2 * BLOCKS_PER_DAY;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_DELAY: u64 = 1;

    /// Maximum configurable delay (~30 days)
    pub const MAX_DELAY: u64 = 30 * BLOCKS_PER_DAY;

    /// Delay used by deployment helpers and tests
    /// - Mainnet: ~2 days
    /// - Testnet: 10 blocks
    #[cfg(feature = "mainnet")]
    pub const DEFAULT_DELAY: u64 = 2 * BLOCKS_PER_DAY;
    #[cfg(not(feature = "mainnet"))]
    pub const DEFAULT_DELAY: u64 = 10;

    /// Signature string of the self-call that changes the delay
    pub const SET_DELAY_SIGNATURE: &str = "setDelay(u64)";

    /// Selector length prefixed to calldata when a signature is given
    pub const SELECTOR_LEN: usize = 4;
}

/// Signature domain configuration
pub mod signing {
    /// Domain name of the governor contract
    pub const GOVERNOR_NAME: &str = "Ballot Governor";

    /// Domain version shared by all contracts
    pub const DOMAIN_VERSION: &str = "1";

    /// Default chain identifier for deployments that do not set one
    pub const DEFAULT_CHAIN_ID: u64 = 1;

    /// Type tag hashed into every domain separator
    pub const DOMAIN_TYPE_TAG: &[u8] =
        b"EIP712Domain(string name,string version,uint64 chainId,bytes32 verifyingContract)";

    /// Type tag of a signed ballot
    pub const BALLOT_TYPE_TAG: &[u8] = b"Ballot(uint64 proposalId,bool support)";

    /// Type tag of a signed delegation
    pub const DELEGATION_TYPE_TAG: &[u8] =
        b"Delegation(bytes32 delegator,bytes32 delegatee,uint64 nonce,uint64 expiry)";

    /// Prefix of the final signed digest
    pub const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];
}

/// Precision constants
pub mod precision {
    /// Percentage denominator (100 = 100%)
    pub const PERCENT_DENOMINATOR: u64 = 100;
}
