//! Print the balance report to stdout.

use stockbook_web::db::{InventoryStore, PgInventoryStore};
use stockbook_web::routes::views::{BalanceReportRow, Directory};

use super::{CommandError, connect};

/// Print one line per (product, location) with a recorded balance.
///
/// # Errors
///
/// Returns an error if the connection or any query fails.
pub async fn run() -> Result<(), CommandError> {
    let store = PgInventoryStore::new(connect().await?);

    let directory = Directory::load(&store).await?;
    let rows = BalanceReportRow::join(&store.balances().await?, &directory);

    #[allow(clippy::print_stdout)]
    {
        if rows.is_empty() {
            println!("No stock recorded.");
            return Ok(());
        }

        println!("{:<30} {:<30} {:>10}", "PRODUCT", "LOCATION", "QUANTITY");
        for row in &rows {
            println!(
                "{:<30} {:<30} {:>10}",
                format!("{} - {}", row.product_id, row.product_name),
                format!("{} - {}", row.location_id, row.location_name),
                row.quantity
            );
        }
    }

    Ok(())
}
