//! Stock balances derived from the movement ledger.
//!
//! The balance of a product at a location is everything moved *to* that
//! location minus everything moved *from* it:
//!
//! ```text
//! balance(p, l) = Σ qty [product = p, to = l] - Σ qty [product = p, from = l]
//! ```
//!
//! The calculation is a single grouped aggregation: one sum grouped by
//! `(product, to_location)`, one grouped by `(product, from_location)`,
//! merged by key. A storage backend that can group in the database
//! produces the two [`LedgerSum`] sets itself and hands them to [`merge`];
//! an in-memory ledger uses [`compute`].
//!
//! Zero balances are dropped and rows are ordered by
//! `(product_id, location_id)`, byte-wise lexicographic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ledger::Movement;
use crate::types::{LocationId, ProductId};

/// One grouped sum of movement quantities for a `(product, location)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSum {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: i64,
}

/// Net stock of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: i64,
}

type Totals = BTreeMap<(ProductId, LocationId), i64>;

/// Merge inbound and outbound sums into the balance report.
///
/// Keys may repeat within either input; repeated keys accumulate.
pub fn merge(
    inbound: impl IntoIterator<Item = LedgerSum>,
    outbound: impl IntoIterator<Item = LedgerSum>,
) -> Vec<Balance> {
    let mut totals = Totals::new();

    for sum in inbound {
        *totals.entry((sum.product_id, sum.location_id)).or_insert(0) += sum.quantity;
    }
    for sum in outbound {
        *totals.entry((sum.product_id, sum.location_id)).or_insert(0) -= sum.quantity;
    }

    totals
        .into_iter()
        .filter(|(_, quantity)| *quantity != 0)
        .map(|((product_id, location_id), quantity)| Balance {
            product_id,
            location_id,
            quantity,
        })
        .collect()
}

/// Compute balances for an in-memory ledger in one pass.
pub fn compute<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Vec<Balance> {
    let mut inbound = Totals::new();
    let mut outbound = Totals::new();

    for movement in movements {
        let qty = i64::from(movement.qty);
        if let Some(to) = &movement.to_location {
            *inbound
                .entry((movement.product_id.clone(), to.clone()))
                .or_insert(0) += qty;
        }
        if let Some(from) = &movement.from_location {
            *outbound
                .entry((movement.product_id.clone(), from.clone()))
                .or_insert(0) += qty;
        }
    }

    merge(into_sums(inbound), into_sums(outbound))
}

fn into_sums(totals: Totals) -> impl Iterator<Item = LedgerSum> {
    totals
        .into_iter()
        .map(|((product_id, location_id), quantity)| LedgerSum {
            product_id,
            location_id,
            quantity,
        })
}
