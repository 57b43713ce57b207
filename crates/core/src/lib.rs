//! Core ledger logic for Ledgerd.
//!
//! This crate contains pure domain logic with ZERO web or database
//! dependencies: the fixed-point amount rules and the derived-balance
//! conventions that the repositories and API layers build on.
//!
//! # Modules
//!
//! - `ledger` - Amount normalization and balance aggregation rules

pub mod ledger;
