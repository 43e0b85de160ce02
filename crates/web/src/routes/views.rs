//! Template-ready views of the domain types.
//!
//! Templates only see plain strings, so optional values are flattened here
//! and movements carry the names of the entities they reference.

use std::collections::BTreeMap;

use stockbook_core::{Balance, Location, LocationId, Movement, MovementKind, Product, ProductId};

use crate::db::{InventoryStore, RepositoryError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Display names for every product and location, keyed by identifier.
#[derive(Debug, Default)]
pub struct Directory {
    products: BTreeMap<ProductId, String>,
    locations: BTreeMap<LocationId, String>,
}

impl Directory {
    /// Build a directory from already loaded catalog rows.
    #[must_use]
    pub fn new(products: &[Product], locations: &[Location]) -> Self {
        Self {
            products: products
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect(),
            locations: locations
                .iter()
                .map(|l| (l.id.clone(), l.name.clone()))
                .collect(),
        }
    }

    /// Load both catalogs from the store.
    ///
    /// # Errors
    ///
    /// Returns the store error if either listing fails.
    pub async fn load(store: &dyn InventoryStore) -> Result<Self, RepositoryError> {
        let products = store.list_products().await?;
        let locations = store.list_locations().await?;
        Ok(Self::new(&products, &locations))
    }

    /// Product name, or the identifier itself when the product is unknown.
    #[must_use]
    pub fn product_name(&self, id: &ProductId) -> String {
        self.products
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Location name, or the identifier itself when the location is unknown.
    #[must_use]
    pub fn location_name(&self, id: &LocationId) -> String {
        self.locations
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationView {
    pub id: String,
    pub name: String,
    pub address: String,
}

impl From<&Location> for LocationView {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.to_string(),
            name: location.name.clone(),
            address: location.address.clone().unwrap_or_default(),
        }
    }
}

/// One ledger row as rendered in tables and the detail page.
#[derive(Debug, Clone)]
pub struct MovementView {
    pub id: String,
    pub timestamp: String,
    pub kind: &'static str,
    /// CSS modifier: `stock-in`, `stock-out` or `transfer`.
    pub kind_class: &'static str,
    pub product_id: String,
    pub product_name: String,
    /// Empty when the movement has no source.
    pub from_id: String,
    pub from_name: String,
    /// Empty when the movement has no destination.
    pub to_id: String,
    pub to_name: String,
    pub qty: i32,
}

impl MovementView {
    #[must_use]
    pub fn new(movement: &Movement, directory: &Directory) -> Self {
        let kind = movement.kind();
        let (from_id, from_name) = movement
            .from_location
            .as_ref()
            .map(|id| (id.to_string(), directory.location_name(id)))
            .unwrap_or_default();
        let (to_id, to_name) = movement
            .to_location
            .as_ref()
            .map(|id| (id.to_string(), directory.location_name(id)))
            .unwrap_or_default();

        Self {
            id: movement.id.to_string(),
            timestamp: movement.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            kind: kind.label(),
            kind_class: kind_class(kind),
            product_id: movement.product_id.to_string(),
            product_name: directory.product_name(&movement.product_id),
            from_id,
            from_name,
            to_id,
            to_name,
            qty: movement.qty,
        }
    }

    /// Map a slice of movements, preserving order.
    #[must_use]
    pub fn list(movements: &[Movement], directory: &Directory) -> Vec<Self> {
        movements
            .iter()
            .map(|m| Self::new(m, directory))
            .collect()
    }
}

const fn kind_class(kind: MovementKind) -> &'static str {
    match kind {
        MovementKind::StockIn => "stock-in",
        MovementKind::StockOut => "stock-out",
        MovementKind::Transfer => "transfer",
    }
}

/// An entry in a `<select>` element.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    /// Product options, marking `selected` as the chosen one.
    #[must_use]
    pub fn products(products: &[Product], selected: Option<&ProductId>) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self {
                value: p.id.to_string(),
                label: format!("{} - {}", p.id, p.name),
                selected: selected == Some(&p.id),
            })
            .collect()
    }

    /// Location options, marking `selected` as the chosen one.
    #[must_use]
    pub fn locations(locations: &[Location], selected: Option<&LocationId>) -> Vec<Self> {
        locations
            .iter()
            .map(|l| Self {
                value: l.id.to_string(),
                label: format!("{} - {}", l.id, l.name),
                selected: selected == Some(&l.id),
            })
            .collect()
    }
}

/// A balance joined with display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReportRow {
    pub product_id: String,
    pub product_name: String,
    pub location_id: String,
    pub location_name: String,
    pub quantity: i64,
}

impl BalanceReportRow {
    /// Join balances with names, keeping the calculator's ordering.
    #[must_use]
    pub fn join(balances: &[Balance], directory: &Directory) -> Vec<Self> {
        balances
            .iter()
            .map(|b| Self {
                product_id: b.product_id.to_string(),
                product_name: directory.product_name(&b.product_id),
                location_id: b.location_id.to_string(),
                location_name: directory.location_name(&b.location_id),
                quantity: b.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use stockbook_core::MovementId;

    use super::*;

    fn directory() -> Directory {
        Directory::new(
            &[Product {
                id: ProductId::new("PROD001"),
                name: "Laptop".to_owned(),
                description: None,
            }],
            &[Location {
                id: LocationId::new("WH001"),
                name: "Main Warehouse".to_owned(),
                address: None,
            }],
        )
    }

    #[test]
    fn test_movement_view_flattens_locations() {
        let movement = Movement {
            id: MovementId::new("MOV009"),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap(),
            from_location: Some(LocationId::new("WH001")),
            to_location: None,
            product_id: ProductId::new("PROD001"),
            qty: 3,
        };

        let view = MovementView::new(&movement, &directory());
        assert_eq!(view.kind, "Stock Out");
        assert_eq!(view.kind_class, "stock-out");
        assert_eq!(view.timestamp, "2025-03-04 09:30");
        assert_eq!(view.from_name, "Main Warehouse");
        assert_eq!(view.product_name, "Laptop");
        assert!(view.to_id.is_empty());
        assert!(view.to_name.is_empty());
    }

    #[test]
    fn test_report_falls_back_to_identifiers() {
        let balances = vec![
            Balance {
                product_id: ProductId::new("PROD001"),
                location_id: LocationId::new("WH001"),
                quantity: 6,
            },
            Balance {
                product_id: ProductId::new("PROD404"),
                location_id: LocationId::new("GONE"),
                quantity: -1,
            },
        ];

        let rows = BalanceReportRow::join(&balances, &directory());
        assert_eq!(rows[0].product_name, "Laptop");
        assert_eq!(rows[0].location_name, "Main Warehouse");
        assert_eq!(rows[1].product_name, "PROD404");
        assert_eq!(rows[1].location_name, "GONE");
    }

    #[test]
    fn test_options_mark_selection() {
        let locations = [
            Location {
                id: LocationId::new("STORE01"),
                name: "Downtown Store".to_owned(),
                address: None,
            },
            Location {
                id: LocationId::new("WH001"),
                name: "Main Warehouse".to_owned(),
                address: None,
            },
        ];
        let options = OptionView::locations(&locations, Some(&LocationId::new("WH001")));
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "WH001 - Main Warehouse");
    }
}
