//! Core types for Stockbook.
//!
//! This module provides type-safe wrappers for identifiers and the two
//! catalog entities that movements reference.

pub mod catalog;
pub mod id;

pub use catalog::{
    Location, LocationUpdate, NewLocation, NewProduct, Product, ProductUpdate, parse_name,
    parse_notes,
};
pub use id::*;
