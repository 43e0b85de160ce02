//! Stockbook web application library.
//!
//! Products, storage locations and a ledger of stock movements behind a
//! server-rendered form UI. The binary in `main.rs` wires configuration,
//! logging and the storage backend; everything else lives here so the
//! integration tests can drive the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod state;
