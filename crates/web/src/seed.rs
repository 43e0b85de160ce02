//! Sample data set for demos and local development.
//!
//! Four products, four locations and twenty movements: stock arrives at both
//! warehouses, part of it is transferred to the stores and the downtown store
//! sells some. Timestamps fall on random working hours over the last 30 days.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use stockbook_core::{
    LocationId, MovementDraft, MovementId, NewLocation, NewMovement, NewProduct, ProductId,
};

use crate::db::{InventoryStore, RepositoryError};

const PRODUCTS: [(&str, &str, &str); 4] = [
    ("PROD001", "Laptop", "High-performance laptop for business use"),
    ("PROD002", "Desktop Computer", "Desktop computer for office work"),
    ("PROD003", "Monitor", "24-inch LCD monitor"),
    ("PROD004", "Keyboard", "Wireless keyboard"),
];

const LOCATIONS: [(&str, &str, &str); 4] = [
    ("WH001", "Main Warehouse", "123 Industrial Blvd, Business District"),
    ("WH002", "Secondary Warehouse", "456 Storage Ave, Industrial Zone"),
    ("STORE01", "Downtown Store", "789 Main St, Downtown"),
    ("STORE02", "Mall Store", "321 Shopping Center, Mall Plaza"),
];

type MovementRow = (&'static str, &'static str, Option<&'static str>, Option<&'static str>, i32);

const MOVEMENTS: [MovementRow; 20] = [
    // Stock in
    ("MOV001", "PROD001", None, Some("WH001"), 50),
    ("MOV002", "PROD002", None, Some("WH001"), 30),
    ("MOV003", "PROD003", None, Some("WH001"), 100),
    ("MOV004", "PROD004", None, Some("WH001"), 200),
    ("MOV005", "PROD001", None, Some("WH002"), 25),
    ("MOV006", "PROD002", None, Some("WH002"), 15),
    ("MOV007", "PROD003", None, Some("WH002"), 50),
    ("MOV008", "PROD004", None, Some("WH002"), 100),
    // Transfers
    ("MOV009", "PROD001", Some("WH001"), Some("STORE01"), 10),
    ("MOV010", "PROD002", Some("WH001"), Some("STORE01"), 5),
    ("MOV011", "PROD003", Some("WH001"), Some("STORE01"), 20),
    ("MOV012", "PROD004", Some("WH001"), Some("STORE01"), 50),
    ("MOV013", "PROD001", Some("WH002"), Some("STORE02"), 8),
    ("MOV014", "PROD002", Some("WH002"), Some("STORE02"), 3),
    ("MOV015", "PROD003", Some("WH002"), Some("STORE02"), 15),
    ("MOV016", "PROD004", Some("WH002"), Some("STORE02"), 30),
    // Stock out
    ("MOV017", "PROD001", Some("STORE01"), None, 3),
    ("MOV018", "PROD002", Some("STORE01"), None, 2),
    ("MOV019", "PROD003", Some("STORE01"), None, 5),
    ("MOV020", "PROD004", Some("STORE01"), None, 10),
];

/// Counts of inserted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub locations: usize,
    pub movements: usize,
}

/// The sample movements with timestamps drawn from `rng`, oldest first.
pub fn sample_movements(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<NewMovement> {
    let base = now - Duration::days(30);

    let mut movements: Vec<NewMovement> = MOVEMENTS
        .iter()
        .map(|&(id, product, from, to, qty)| {
            let offset = Duration::days(rng.random_range(0..=29))
                + Duration::hours(rng.random_range(8..=17))
                + Duration::minutes(rng.random_range(0..=59));
            NewMovement {
                id: MovementId::new(id),
                timestamp: Some(base + offset),
                draft: MovementDraft {
                    from_location: from.map(LocationId::new),
                    to_location: to.map(LocationId::new),
                    product_id: ProductId::new(product),
                    qty,
                },
            }
        })
        .collect();

    movements.sort_by_key(|m| m.timestamp);
    movements
}

/// Insert the sample data set through `store`.
///
/// The store must not already contain any of the sample identifiers.
///
/// # Errors
///
/// Returns the first store error; rows inserted before it are kept.
pub async fn load_sample_data(
    store: &dyn InventoryStore,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<SeedSummary, RepositoryError> {
    for (id, name, description) in PRODUCTS {
        store
            .create_product(&NewProduct {
                id: ProductId::new(id),
                name: name.to_owned(),
                description: Some(description.to_owned()),
            })
            .await?;
    }

    for (id, name, address) in LOCATIONS {
        store
            .create_location(&NewLocation {
                id: LocationId::new(id),
                name: name.to_owned(),
                address: Some(address.to_owned()),
            })
            .await?;
    }

    let movements = sample_movements(rng, now);
    for movement in &movements {
        store.record_movement(movement).await?;
    }

    tracing::info!(
        products = PRODUCTS.len(),
        locations = LOCATIONS.len(),
        movements = movements.len(),
        "Sample data loaded"
    );

    Ok(SeedSummary {
        products: PRODUCTS.len(),
        locations: LOCATIONS.len(),
        movements: movements.len(),
    })
}
