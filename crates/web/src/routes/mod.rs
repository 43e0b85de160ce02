//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page with catalog and ledger counts
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (store ping)
//!
//! # Products
//! GET  /products                  - Product listing
//! GET  /products/add              - Add form
//! POST /products/add              - Create product
//! GET  /products/edit/{id}        - Edit form
//! POST /products/edit/{id}        - Update product
//! GET  /products/view/{id}        - Product detail with its movements
//!
//! # Locations
//! GET  /locations                 - Location listing
//! GET  /locations/add             - Add form
//! POST /locations/add             - Create location
//! GET  /locations/edit/{id}       - Edit form
//! POST /locations/edit/{id}       - Update location
//! GET  /locations/view/{id}       - Location detail with incoming/outgoing movements
//!
//! # Movements
//! GET  /movements                 - Ledger, newest first
//! GET  /movements/add             - Add form
//! POST /movements/add             - Record movement
//! GET  /movements/edit/{id}       - Edit form
//! POST /movements/edit/{id}       - Amend movement
//! GET  /movements/view/{id}       - Movement detail
//!
//! # Reports
//! GET  /reports/balance           - Stock balance per product and location
//! ```

pub mod forms;
pub mod health;
pub mod home;
pub mod locations;
pub mod movements;
pub mod products;
pub mod reports;
pub mod views;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{Flash, push_flash, take_flashes};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/add", get(products::add_form).post(products::add))
        .route("/edit/{id}", get(products::edit_form).post(products::edit))
        .route("/view/{id}", get(products::view))
}

/// Create the location routes router.
pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(locations::index))
        .route("/add", get(locations::add_form).post(locations::add))
        .route("/edit/{id}", get(locations::edit_form).post(locations::edit))
        .route("/view/{id}", get(locations::view))
}

/// Create the movement routes router.
pub fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(movements::index))
        .route("/add", get(movements::add_form).post(movements::add))
        .route("/edit/{id}", get(movements::edit_form).post(movements::edit))
        .route("/view/{id}", get(movements::view))
}

/// Create all routes for the application.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/locations", location_routes())
        .nest("/movements", movement_routes())
        .route("/reports/balance", get(reports::balance))
}

// =============================================================================
// Flash helpers shared by the form handlers
// =============================================================================

/// Pending flash messages followed by the ones raised by this request.
async fn flashes_with(
    session: &Session,
    extra: impl IntoIterator<Item = Flash>,
) -> Result<Vec<Flash>, AppError> {
    let mut flashes = take_flashes(session).await?;
    flashes.extend(extra);
    Ok(flashes)
}

/// Queue a flash message and redirect (303 See Other).
async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Result<Response, AppError> {
    push_flash(session, [flash]).await?;
    Ok(Redirect::to(to).into_response())
}
