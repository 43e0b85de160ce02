//! `PostgreSQL` implementation of [`InventoryStore`].
//!
//! Queries are checked at runtime and rows are decoded through
//! `sqlx::FromRow` structs. Identifier columns decode straight into the
//! core newtypes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockbook_core::balance::{self, LedgerSum};
use stockbook_core::{
    Balance, Location, LocationId, LocationUpdate, Movement, MovementDraft, MovementId,
    NewLocation, NewMovement, NewProduct, Product, ProductId, ProductUpdate,
};

use super::{InventoryCounts, InventoryStore, LocationMovements, RepositoryError, ensure_valid};

const MOVEMENT_COLUMNS: &str = r#"movement_id, "timestamp", from_location, to_location, product_id, qty"#;

/// Newest first; identifiers compare byte-wise (`COLLATE "C"`) so ties order
/// the same as `Ord` on the newtypes.
const NEWEST_FIRST: &str = r#""timestamp" DESC, movement_id COLLATE "C""#;

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: ProductId,
    name: String,
    description: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.product_id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    location_id: LocationId,
    name: String,
    address: Option<String>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.location_id,
            name: row.name,
            address: row.address,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MovementRow {
    movement_id: MovementId,
    timestamp: DateTime<Utc>,
    from_location: Option<LocationId>,
    to_location: Option<LocationId>,
    product_id: ProductId,
    qty: i32,
}

impl From<MovementRow> for Movement {
    fn from(row: MovementRow) -> Self {
        Self {
            id: row.movement_id,
            timestamp: row.timestamp,
            from_location: row.from_location,
            to_location: row.to_location,
            product_id: row.product_id,
            qty: row.qty,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerSumRow {
    product_id: ProductId,
    location_id: LocationId,
    quantity: i64,
    inbound: bool,
}

#[derive(sqlx::FromRow)]
struct CountsRow {
    products: i64,
    locations: i64,
    movements: i64,
}

impl From<CountsRow> for InventoryCounts {
    fn from(row: CountsRow) -> Self {
        let count = |n: i64| usize::try_from(n).unwrap_or_default();
        Self {
            products: count(row.products),
            locations: count(row.locations),
            movements: count(row.movements),
        }
    }
}

impl From<LedgerSumRow> for LedgerSum {
    fn from(row: LedgerSumRow) -> Self {
        Self {
            product_id: row.product_id,
            location_id: row.location_id,
            quantity: row.quantity,
        }
    }
}

/// Map constraint violations on writes to domain errors.
fn map_write_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or("product_movement");
            return RepositoryError::UnknownReference(constraint.to_owned());
        }
    }
    RepositoryError::Database(e)
}

/// Store backed by the `inventory` schema.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Delete every movement, location and product in one transaction.
    ///
    /// Used by the seed command before loading demo data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any delete fails; nothing is
    /// removed in that case.
    pub async fn reset(&self) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM inventory.product_movement")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM inventory.location")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM inventory.product")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn movements_where(
        &self,
        predicate: &str,
        key: &str,
    ) -> Result<Vec<Movement>, RepositoryError> {
        let sql = format!(
            r"SELECT {MOVEMENT_COLUMNS} FROM inventory.product_movement
              WHERE {predicate}
              ORDER BY {NEWEST_FIRST}"
        );
        let rows = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Movement::from).collect())
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT product_id, name, description
            FROM inventory.product
            ORDER BY product_id COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, description
            FROM inventory.product
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO inventory.product (product_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING product_id, name, description
            ",
        )
        .bind(&input.id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "product id already exists"))?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE inventory.product
            SET name = $2, description = $3
            WHERE product_id = $1
            RETURNING product_id, name, description
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    // -------------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------------

    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT location_id, name, address
            FROM inventory.location
            ORDER BY location_id COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn get_location(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            SELECT location_id, name, address
            FROM inventory.location
            WHERE location_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Location::from))
    }

    async fn create_location(&self, input: &NewLocation) -> Result<Location, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            INSERT INTO inventory.location (location_id, name, address)
            VALUES ($1, $2, $3)
            RETURNING location_id, name, address
            ",
        )
        .bind(&input.id)
        .bind(&input.name)
        .bind(input.address.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "location id already exists"))?;

        Ok(row.into())
    }

    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationUpdate,
    ) -> Result<Location, RepositoryError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r"
            UPDATE inventory.location
            SET name = $2, address = $3
            WHERE location_id = $1
            RETURNING location_id, name, address
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.address.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Location::from).ok_or(RepositoryError::NotFound)
    }

    // -------------------------------------------------------------------------
    // Movements
    // -------------------------------------------------------------------------

    async fn list_movements(&self) -> Result<Vec<Movement>, RepositoryError> {
        let sql = format!(
            r"SELECT {MOVEMENT_COLUMNS} FROM inventory.product_movement
              ORDER BY {NEWEST_FIRST}"
        );
        let rows = sqlx::query_as::<_, MovementRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movement::from).collect())
    }

    async fn get_movement(&self, id: &MovementId) -> Result<Option<Movement>, RepositoryError> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory.product_movement WHERE movement_id = $1"
        );
        let row = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Movement::from))
    }

    async fn record_movement(&self, input: &NewMovement) -> Result<Movement, RepositoryError> {
        ensure_valid(&input.draft)?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"INSERT INTO inventory.product_movement
                   (movement_id, "timestamp", from_location, to_location, product_id, qty)
               VALUES ($1, COALESCE($2, now()), $3, $4, $5, $6)
               RETURNING {MOVEMENT_COLUMNS}"#
        );
        let row = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(&input.id)
            .bind(input.timestamp)
            .bind(input.draft.from_location.as_ref())
            .bind(input.draft.to_location.as_ref())
            .bind(&input.draft.product_id)
            .bind(input.draft.qty)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "movement id already exists"))?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn amend_movement(
        &self,
        id: &MovementId,
        draft: &MovementDraft,
    ) -> Result<Movement, RepositoryError> {
        ensure_valid(draft)?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"UPDATE inventory.product_movement
              SET from_location = $2, to_location = $3, product_id = $4, qty = $5
              WHERE movement_id = $1
              RETURNING {MOVEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovementRow>(&sql)
            .bind(id)
            .bind(draft.from_location.as_ref())
            .bind(draft.to_location.as_ref())
            .bind(&draft.product_id)
            .bind(draft.qty)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "movement id already exists"))?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn movements_for_product(
        &self,
        id: &ProductId,
    ) -> Result<Vec<Movement>, RepositoryError> {
        self.movements_where("product_id = $1", id.as_str()).await
    }

    async fn movements_for_location(
        &self,
        id: &LocationId,
    ) -> Result<LocationMovements, RepositoryError> {
        // One statement so both lists come from the same snapshot
        let movements = self
            .movements_where("to_location = $1 OR from_location = $1", id.as_str())
            .await?;

        let (incoming, outgoing): (Vec<_>, Vec<_>) = movements
            .into_iter()
            .partition(|m| m.to_location.as_ref() == Some(id));

        Ok(LocationMovements { incoming, outgoing })
    }

    async fn balances(&self) -> Result<Vec<Balance>, RepositoryError> {
        // Both grouped sums in one statement, so they see the same snapshot
        let rows = sqlx::query_as::<_, LedgerSumRow>(
            r"
            SELECT product_id, to_location AS location_id,
                   SUM(qty)::BIGINT AS quantity, TRUE AS inbound
            FROM inventory.product_movement
            WHERE to_location IS NOT NULL
            GROUP BY product_id, to_location
            UNION ALL
            SELECT product_id, from_location AS location_id,
                   SUM(qty)::BIGINT AS quantity, FALSE AS inbound
            FROM inventory.product_movement
            WHERE from_location IS NOT NULL
            GROUP BY product_id, from_location
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let (inbound, outbound): (Vec<_>, Vec<_>) = rows.into_iter().partition(|row| row.inbound);

        Ok(balance::merge(
            inbound.into_iter().map(LedgerSum::from),
            outbound.into_iter().map(LedgerSum::from),
        ))
    }

    async fn counts(&self) -> Result<InventoryCounts, RepositoryError> {
        let row = sqlx::query_as::<_, CountsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM inventory.product) AS products,
                (SELECT COUNT(*) FROM inventory.location) AS locations,
                (SELECT COUNT(*) FROM inventory.product_movement) AS movements
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
