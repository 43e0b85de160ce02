//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, take_flashes};
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub flashes: Vec<Flash>,
    pub product_count: usize,
    pub location_count: usize,
    pub movement_count: usize,
}

/// Display the landing page with catalog and ledger counts.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let counts = state.store().counts().await?;

    Ok(HomeTemplate {
        flashes: take_flashes(&session).await?,
        product_count: counts.products,
        location_count: counts.locations,
        movement_count: counts.movements,
    })
}
