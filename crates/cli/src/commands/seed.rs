//! Load the sample data set into the database.
//!
//! By default the inventory tables are cleared first so the command can be
//! re-run. Sessions are left alone.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use stockbook_web::db::{InventoryStore, PgInventoryStore};
use stockbook_web::seed::load_sample_data;

use super::{CommandError, connect};

/// Seed products, locations and movements.
///
/// # Arguments
///
/// * `keep_existing` - Skip clearing the inventory tables. Fails with a
///   conflict if any sample identifier already exists.
///
/// # Errors
///
/// Returns an error if the connection, the clearing step or any insert fails.
pub async fn run(keep_existing: bool) -> Result<(), CommandError> {
    let store = PgInventoryStore::new(connect().await?);

    if keep_existing {
        info!("Keeping existing inventory data");
    } else {
        info!("Clearing existing inventory data");
        store.reset().await?;
    }

    let mut rng = StdRng::from_os_rng();
    let summary = load_sample_data(&store, &mut rng, chrono::Utc::now()).await?;

    info!("Seeding complete!");
    info!("  Products: {}", summary.products);
    info!("  Locations: {}", summary.locations);
    info!("  Movements: {}", summary.movements);

    info!("Current stock:");
    for balance in store.balances().await? {
        info!(
            "  {} @ {}: {}",
            balance.product_id, balance.location_id, balance.quantity
        );
    }

    Ok(())
}
