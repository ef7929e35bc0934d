/// Default chip face values, ascending.
pub const DEFAULT_DENOMINATIONS: [u64; 5] = [1, 5, 25, 100, 500];

/// Maximum number of distinct denominations a table may use.
pub const MAX_DENOMINATIONS: usize = 16;

/// Most chips a single decomposition may produce.
pub const MAX_DECOMPOSITION_CHIPS: u64 = 1_000_000;

/// Opening cash for a new player session.
pub const STARTING_CASH: u64 = 1_000;

/// Chips the house stack is floated with when a table opens.
pub const DEFAULT_HOUSE_FLOAT: u64 = 100_000;

/// Totals bucket for bets placed on the push slot.
pub const TIE_BUCKET: &str = "tie";

/// Maximum outcome name length accepted from policies and encoded records.
pub const MAX_OUTCOME_NAME_LENGTH: usize = 32;

/// Maximum outcomes a single game policy may declare.
pub const MAX_OUTCOMES: usize = 64;

/// Maximum chips carried by a single encoded record.
pub const MAX_RECORD_CHIPS: usize = 4_096;

/// Error codes surfaced to the presentation layer.
pub const ERROR_INVALID_AMOUNT: u8 = 1;
pub const ERROR_UNBREAKABLE: u8 = 2;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 3;
pub const ERROR_UNREPRESENTABLE: u8 = 4;
pub const ERROR_CHANGE_UNAVAILABLE: u8 = 5;
pub const ERROR_EMPTY_BET: u8 = 6;
pub const ERROR_BETTING_CLOSED: u8 = 7;
pub const ERROR_NOT_FOUND: u8 = 8;
pub const ERROR_ILLEGAL_TRANSFER: u8 = 9;
pub const ERROR_UNKNOWN_OUTCOME: u8 = 10;
pub const ERROR_INVALID_PHASE: u8 = 11;
