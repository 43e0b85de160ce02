//! Storage access for products, locations and the movement ledger.
//!
//! # Database: `PostgreSQL`, schema `inventory`
//!
//! ## Tables
//!
//! - `product` - Product catalog, keyed by user-assigned `product_id`
//! - `location` - Storage locations, keyed by user-assigned `location_id`
//! - `product_movement` - The movement ledger (nullable FKs for from/to)
//! - `session` - Tower-sessions storage (flash messages)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p stockbook-cli -- migrate
//! ```
//!
//! # Store implementations
//!
//! Handlers only see the [`InventoryStore`] trait. [`PgInventoryStore`] is the
//! production backend; [`MemoryInventoryStore`] keeps the same observable
//! behavior in process for tests and local demos.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stockbook_core::{
    Balance, Location, LocationId, LocationUpdate, Movement, MovementDraft, MovementError,
    MovementId, NewLocation, NewMovement, NewProduct, Product, ProductId, ProductUpdate,
};

pub use memory::MemoryInventoryStore;
pub use postgres::PgInventoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage backend failed outside of sqlx.
    #[error("storage error: {0}")]
    Storage(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Primary key already taken.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A movement references a product or location that does not exist.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// The movement breaks one or more ledger rules; nothing was written.
    #[error("invalid movement: {}", join_errors(.0))]
    Invalid(Vec<MovementError>),
}

fn join_errors(errors: &[MovementError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Movements touching one location, split by direction. Both lists are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationMovements {
    /// Movements whose destination is the location.
    pub incoming: Vec<Movement>,
    /// Movements whose source is the location.
    pub outgoing: Vec<Movement>,
}

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryCounts {
    pub products: usize,
    pub locations: usize,
    pub movements: usize,
}

/// Storage access used by every handler.
///
/// Listing order: products and locations by identifier; movements newest
/// first with the identifier as tie-breaker.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product. An existing identifier yields `Conflict` and the
    /// stored row is left untouched.
    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError>;

    async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductUpdate,
    ) -> Result<Product, RepositoryError>;

    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError>;

    async fn get_location(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError>;

    /// Insert a location. An existing identifier yields `Conflict`.
    async fn create_location(&self, input: &NewLocation) -> Result<Location, RepositoryError>;

    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationUpdate,
    ) -> Result<Location, RepositoryError>;

    async fn list_movements(&self) -> Result<Vec<Movement>, RepositoryError>;

    async fn get_movement(&self, id: &MovementId) -> Result<Option<Movement>, RepositoryError>;

    /// Validate and append a movement.
    ///
    /// Returns `Invalid` when a ledger rule is broken, `Conflict` for a taken
    /// identifier and `UnknownReference` for a missing product or location.
    async fn record_movement(&self, input: &NewMovement) -> Result<Movement, RepositoryError>;

    /// Validate and replace the editable fields of a movement.
    ///
    /// Identifier and timestamp are preserved. On any error the stored
    /// movement is unchanged.
    async fn amend_movement(
        &self,
        id: &MovementId,
        draft: &MovementDraft,
    ) -> Result<Movement, RepositoryError>;

    async fn movements_for_product(&self, id: &ProductId)
    -> Result<Vec<Movement>, RepositoryError>;

    async fn movements_for_location(
        &self,
        id: &LocationId,
    ) -> Result<LocationMovements, RepositoryError>;

    /// Non-zero balances ordered by `(product_id, location_id)`.
    ///
    /// Computed from one consistent view of the ledger.
    async fn balances(&self) -> Result<Vec<Balance>, RepositoryError>;

    /// Number of products, locations and movements, without loading rows.
    async fn counts(&self) -> Result<InventoryCounts, RepositoryError>;
}

/// Run the ledger rules before a write, converting failures to `Invalid`.
pub(crate) fn ensure_valid(draft: &MovementDraft) -> Result<(), RepositoryError> {
    let errors = draft.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::Invalid(errors))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
