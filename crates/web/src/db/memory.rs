//! In-process implementation of [`InventoryStore`].
//!
//! Mirrors the `PostgreSQL` constraints (primary keys, foreign keys, ledger
//! rules) so handlers behave the same against either backend. Every write
//! checks all constraints before touching the tables, so a rejected write
//! leaves no trace.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use stockbook_core::balance;
use stockbook_core::{
    Balance, Location, LocationId, LocationUpdate, Movement, MovementDraft, MovementId,
    NewLocation, NewMovement, NewProduct, Product, ProductId, ProductUpdate,
};

use super::{InventoryCounts, InventoryStore, LocationMovements, RepositoryError, ensure_valid};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    locations: BTreeMap<LocationId, Location>,
    movements: BTreeMap<MovementId, Movement>,
}

impl Tables {
    fn check_references(&self, draft: &MovementDraft) -> Result<(), RepositoryError> {
        if !self.products.contains_key(&draft.product_id) {
            return Err(RepositoryError::UnknownReference(format!(
                "product {}",
                draft.product_id
            )));
        }
        for location in [&draft.from_location, &draft.to_location]
            .into_iter()
            .flatten()
        {
            if !self.locations.contains_key(location) {
                return Err(RepositoryError::UnknownReference(format!(
                    "location {location}"
                )));
            }
        }
        Ok(())
    }

    fn movements_matching(&self, predicate: impl Fn(&Movement) -> bool) -> Vec<Movement> {
        let mut selected: Vec<Movement> = self
            .movements
            .values()
            .filter(|m| predicate(m))
            .cloned()
            .collect();
        newest_first(&mut selected);
        selected
    }
}

/// Order movements newest first, identifier ascending on equal timestamps.
fn newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}

/// Store holding every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    tables: RwLock<Tables>,
}

impl MemoryInventoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Storage("memory store lock poisoned".to_owned()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Storage("memory store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read().map(|_| ())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.read()?.products.get(id).cloned())
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.write()?;
        if tables.products.contains_key(&input.id) {
            return Err(RepositoryError::Conflict(
                "product id already exists".to_owned(),
            ));
        }
        let product = Product::from(input.clone());
        tables.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let mut tables = self.write()?;
        let product = tables
            .products
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        product.name.clone_from(&input.name);
        product.description.clone_from(&input.description);
        Ok(product.clone())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, RepositoryError> {
        Ok(self.read()?.locations.values().cloned().collect())
    }

    async fn get_location(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        Ok(self.read()?.locations.get(id).cloned())
    }

    async fn create_location(&self, input: &NewLocation) -> Result<Location, RepositoryError> {
        let mut tables = self.write()?;
        if tables.locations.contains_key(&input.id) {
            return Err(RepositoryError::Conflict(
                "location id already exists".to_owned(),
            ));
        }
        let location = Location::from(input.clone());
        tables
            .locations
            .insert(location.id.clone(), location.clone());
        Ok(location)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationUpdate,
    ) -> Result<Location, RepositoryError> {
        let mut tables = self.write()?;
        let location = tables
            .locations
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        location.name.clone_from(&input.name);
        location.address.clone_from(&input.address);
        Ok(location.clone())
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, RepositoryError> {
        Ok(self.read()?.movements_matching(|_| true))
    }

    async fn get_movement(&self, id: &MovementId) -> Result<Option<Movement>, RepositoryError> {
        Ok(self.read()?.movements.get(id).cloned())
    }

    async fn record_movement(&self, input: &NewMovement) -> Result<Movement, RepositoryError> {
        ensure_valid(&input.draft)?;

        let mut tables = self.write()?;
        if tables.movements.contains_key(&input.id) {
            return Err(RepositoryError::Conflict(
                "movement id already exists".to_owned(),
            ));
        }
        tables.check_references(&input.draft)?;

        let movement = Movement::from_draft(
            input.id.clone(),
            input.timestamp.unwrap_or_else(Utc::now),
            input.draft.clone(),
        );
        tables
            .movements
            .insert(movement.id.clone(), movement.clone());
        Ok(movement)
    }

    async fn amend_movement(
        &self,
        id: &MovementId,
        draft: &MovementDraft,
    ) -> Result<Movement, RepositoryError> {
        ensure_valid(draft)?;

        let mut tables = self.write()?;
        if !tables.movements.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        tables.check_references(draft)?;

        let movement = tables
            .movements
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        movement.apply(draft.clone());
        Ok(movement.clone())
    }

    async fn movements_for_product(
        &self,
        id: &ProductId,
    ) -> Result<Vec<Movement>, RepositoryError> {
        Ok(self.read()?.movements_matching(|m| &m.product_id == id))
    }

    async fn movements_for_location(
        &self,
        id: &LocationId,
    ) -> Result<LocationMovements, RepositoryError> {
        let tables = self.read()?;
        Ok(LocationMovements {
            incoming: tables.movements_matching(|m| m.to_location.as_ref() == Some(id)),
            outgoing: tables.movements_matching(|m| m.from_location.as_ref() == Some(id)),
        })
    }

    async fn balances(&self) -> Result<Vec<Balance>, RepositoryError> {
        Ok(balance::compute(self.read()?.movements.values()))
    }

    async fn counts(&self) -> Result<InventoryCounts, RepositoryError> {
        let tables = self.read()?;
        Ok(InventoryCounts {
            products: tables.products.len(),
            locations: tables.locations.len(),
            movements: tables.movements.len(),
        })
    }
}
