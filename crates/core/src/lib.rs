//! Stockbook Core - Domain types and ledger rules.
//!
//! This crate provides the types and rules shared by all Stockbook components:
//! - `web` - HTTP server with the product, location, movement and report pages
//! - `cli` - Command-line tools for migrations, seed data and reports
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Storage lives in the `web` crate behind the
//! `InventoryStore` trait.
//!
//! # Modules
//!
//! - [`types`] - Identifier newtypes, products and locations
//! - [`ledger`] - Stock movements, the movement validator and classifier
//! - [`balance`] - Balance calculation over the movement ledger

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod balance;
pub mod ledger;
pub mod types;

pub use balance::{Balance, LedgerSum};
pub use ledger::{Movement, MovementDraft, MovementError, MovementKind, NewMovement};
pub use types::*;
