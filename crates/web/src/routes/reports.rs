//! Stock balance report.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{BalanceReportRow, Directory};
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, take_flashes};
use crate::state::AppState;

/// Balance report template.
#[derive(Template, WebTemplate)]
#[template(path = "reports/balance.html")]
pub struct BalanceReportTemplate {
    pub flashes: Vec<Flash>,
    pub rows: Vec<BalanceReportRow>,
}

/// GET /reports/balance
///
/// Rows come from the store in `(product_id, location_id)` order; zero
/// balances are already excluded.
#[instrument(skip_all)]
pub async fn balance(
    State(state): State<AppState>,
    session: Session,
) -> Result<BalanceReportTemplate> {
    let balances = state.store().balances().await?;
    let directory = Directory::load(state.store()).await?;
    tracing::debug!(rows = balances.len(), "Balance report computed");

    Ok(BalanceReportTemplate {
        flashes: take_flashes(&session).await?,
        rows: BalanceReportRow::join(&balances, &directory),
    })
}
