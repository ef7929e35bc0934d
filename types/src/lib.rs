//! Shared types for the felt chip economy.
//!
//! Everything here is plain data plus the binary codec used for audit records; the
//! execution crate owns all mutable state.

pub mod chips;

pub use chips::*;
