//! Chip-economy domain types.
//!
//! Defines chips and denomination tables, pile/bet identifiers, round phases, game policies,
//! errors and the audit records the execution layer reports to its collaborators.

mod audit;
mod codec;
mod constants;
mod denomination;
mod error;
mod game;
mod ids;
mod policy;

pub use audit::*;
pub use codec::{name_encode_size, read_name, read_outcome_name, write_name};
pub use constants::*;
pub use denomination::*;
pub use error::*;
pub use game::*;
pub use ids::*;
pub use policy::*;

#[cfg(test)]
mod tests;
