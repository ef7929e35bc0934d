//! Felt execution layer.
//!
//! This crate moves chips. It owns the piles on a table (player stack, house stack, bets),
//! enforces the legal transfer graph and round phases, settles rounds against a game
//! variant's policy and reports every committed movement to an audit sink.
//!
//! ## Invariants
//! - Chips are only created by `cash_in` and only destroyed by `cash_out`. At every step
//!   `sum(piles) + cash_out_total == cash_in_total + house_float`.
//! - Every mutating operation either fully commits or leaves all piles unchanged.
//! - Bet ids are never reused on a table.
//!
//! The primary entrypoint is [`Table`].
//!
//! ## One round (example)
//! ```rust
//! use felt_execution::{MemorySink, Table, TableConfig};
//! use felt_execution::registry::GameRegistry;
//! use felt_types::{GameType, PileId};
//!
//! let policy = GameRegistry::new().policy_for(GameType::Baccarat).unwrap();
//! let mut table = Table::new(TableConfig::new(GameType::Baccarat, policy), MemorySink::new())
//!     .unwrap();
//! table.cash_in(1_000).unwrap();
//! table.place_bet("Banker".into(), PileId::Player, 100).unwrap();
//! table.lock().unwrap();
//! let report = table.resolve(&["Banker"]).unwrap();
//! assert_eq!(report.net(), 95);
//! assert_eq!(table.cash_out(PileId::Player).unwrap(), 1_095);
//! ```

pub mod audit;
pub mod engine;
pub mod ledger;
pub mod logging;
pub mod pile;
pub mod registry;
pub mod round;
pub mod table;


pub use audit::{AuditSink, GameStats, LogSink, MemorySink, NullSink, StatsSink};
pub use engine::{Resolution, Settled, TransferEngine};
pub use ledger::{Bet, BetTarget, BettingArea, WagerLedger};
pub use pile::ChipPile;
pub use registry::{
    BaccaratConfig, BingoConfig, BingoPattern, GameConfig, GameInfo, GameRegistry, KenoConfig,
    MAX_BINGO_CARDS,
};
pub use round::{RoundController, SettlementReport};
pub use table::{
    DragToken, DropOutcome, DropTarget, Table, TableConfig, TableError, TableSnapshot,
};
