use std::fmt;
use thiserror::Error as ThisError;

use super::{
    BetId, PileId, RoundPhase, ERROR_BETTING_CLOSED, ERROR_CHANGE_UNAVAILABLE, ERROR_EMPTY_BET,
    ERROR_ILLEGAL_TRANSFER, ERROR_INSUFFICIENT_FUNDS, ERROR_INVALID_AMOUNT, ERROR_INVALID_PHASE,
    ERROR_NOT_FOUND, ERROR_UNBREAKABLE, ERROR_UNKNOWN_OUTCOME, ERROR_UNREPRESENTABLE,
};

/// What a [WagerError::NotFound] was looking for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    Chip(u64),
    Pile(PileId),
    Bet(BetId),
    Area(String),
    Drag(u64),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Chip(value) => write!(f, "chip of value {value}"),
            Missing::Pile(id) => write!(f, "pile {id}"),
            Missing::Bet(id) => write!(f, "{id}"),
            Missing::Area(name) => write!(f, "betting area '{name}'"),
            Missing::Drag(id) => write!(f, "drag #{id}"),
        }
    }
}

/// Errors raised by the chip economy. Every kind is recoverable by the caller.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum WagerError {
    #[error("amount {amount} cannot be expressed with the table's denominations")]
    InvalidAmount { amount: u64 },
    #[error("chip of value {value} has no smaller denomination to break into")]
    Unbreakable { value: u64 },
    #[error("insufficient funds (available={available}, requested={requested})")]
    InsufficientFunds { available: u64, requested: u64 },
    #[error("no combination of chips in the pile sums to {amount}")]
    Unrepresentable { amount: u64 },
    #[error("house cannot supply change for a chip of value {value}")]
    ChangeUnavailable { value: u64 },
    #[error("a bet needs at least one chip")]
    EmptyBet,
    #[error("betting is closed for round {round} ({phase})")]
    BettingClosed { round: u64, phase: RoundPhase },
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("chips cannot move from {from} to {to}")]
    IllegalTransfer { from: PileId, to: PileId },
    #[error("outcome '{name}' is not offered by this game")]
    UnknownOutcome { name: String },
    #[error("round is {actual}, expected {expected}")]
    InvalidPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },
}

impl WagerError {
    /// Stable numeric code for the presentation layer.
    pub fn code(&self) -> u8 {
        match self {
            WagerError::InvalidAmount { .. } => ERROR_INVALID_AMOUNT,
            WagerError::Unbreakable { .. } => ERROR_UNBREAKABLE,
            WagerError::InsufficientFunds { .. } => ERROR_INSUFFICIENT_FUNDS,
            WagerError::Unrepresentable { .. } => ERROR_UNREPRESENTABLE,
            WagerError::ChangeUnavailable { .. } => ERROR_CHANGE_UNAVAILABLE,
            WagerError::EmptyBet => ERROR_EMPTY_BET,
            WagerError::BettingClosed { .. } => ERROR_BETTING_CLOSED,
            WagerError::NotFound(_) => ERROR_NOT_FOUND,
            WagerError::IllegalTransfer { .. } => ERROR_ILLEGAL_TRANSFER,
            WagerError::UnknownOutcome { .. } => ERROR_UNKNOWN_OUTCOME,
            WagerError::InvalidPhase { .. } => ERROR_INVALID_PHASE,
        }
    }
}

/// Errors raised while validating a game policy.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy declares no outcomes")]
    NoOutcomes,
    #[error("policy declares {count} outcomes (max {max})")]
    TooManyOutcomes { count: usize, max: usize },
    #[error("outcome name '{name}' is empty or longer than {max} bytes")]
    InvalidOutcomeName { name: String, max: usize },
    #[error("outcome '{name}' is declared twice")]
    DuplicateOutcome { name: String },
    #[error("outcome '{name}' has no payout ratio")]
    MissingRatio { name: String },
    #[error("payout ratio given for undeclared outcome '{name}'")]
    UndeclaredRatio { name: String },
    #[error("push outcome '{name}' is not a declared outcome")]
    UndeclaredPush { name: String },
    #[error("invalid payout ratio '{value}': {reason}")]
    InvalidRatio { value: String, reason: &'static str },
}
