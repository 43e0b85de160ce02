//! Movement ledger route handlers.
//!
//! Form input is shape-checked here; the ledger rules and reference checks
//! run in the store so a rejected write never reaches storage.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use stockbook_core::{Movement, MovementId};

use super::forms::{MovementEditForm, MovementForm};
use super::views::{Directory, MovementView, OptionView};
use super::{flashes_with, redirect_with};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, take_flashes};
use crate::state::AppState;

const UNKNOWN_REFERENCE: &str = "Unknown product or location referenced";

#[derive(Template, WebTemplate)]
#[template(path = "movements/index.html")]
pub struct MovementsIndexTemplate {
    pub flashes: Vec<Flash>,
    pub movements: Vec<MovementView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "movements/add.html")]
pub struct MovementAddTemplate {
    pub flashes: Vec<Flash>,
    pub products: Vec<OptionView>,
    pub locations: Vec<OptionView>,
}

/// Edit form, prefilled with the stored movement.
#[derive(Template, WebTemplate)]
#[template(path = "movements/edit.html")]
pub struct MovementEditTemplate {
    pub flashes: Vec<Flash>,
    pub movement: MovementView,
    pub products: Vec<OptionView>,
    pub from_locations: Vec<OptionView>,
    pub to_locations: Vec<OptionView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "movements/view.html")]
pub struct MovementDetailTemplate {
    pub flashes: Vec<Flash>,
    pub movement: MovementView,
}

/// Messages for a write the store refused on the user's account.
///
/// Returns `None` for storage failures, which get a generic message.
fn rejection_flashes(err: &RepositoryError) -> Option<Vec<Flash>> {
    match err {
        RepositoryError::Invalid(errors) => Some(
            errors
                .iter()
                .map(|e| Flash::error(e.to_string()))
                .collect(),
        ),
        RepositoryError::Conflict(_) => Some(vec![Flash::error("Movement ID already exists!")]),
        RepositoryError::UnknownReference(_) => Some(vec![Flash::error(UNKNOWN_REFERENCE)]),
        _ => None,
    }
}

async fn find_movement(state: &AppState, id: &MovementId) -> Result<Movement> {
    state
        .store()
        .get_movement(id)
        .await?
        .ok_or_else(|| AppError::not_found("Movement", id))
}

/// GET /movements
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<MovementsIndexTemplate> {
    let movements = state.store().list_movements().await?;
    let directory = Directory::load(state.store()).await?;

    Ok(MovementsIndexTemplate {
        flashes: take_flashes(&session).await?,
        movements: MovementView::list(&movements, &directory),
    })
}

/// GET /movements/add
#[instrument(skip_all)]
pub async fn add_form(State(state): State<AppState>, session: Session) -> Result<Response> {
    render_add(&state, take_flashes(&session).await?).await
}

/// POST /movements/add
#[instrument(skip_all, fields(movement_id = %form.movement_id.trim()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<MovementForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected movement form");
            let flashes = flashes_with(&session, [Flash::error(e.to_string())]).await?;
            return render_add(&state, flashes).await;
        }
    };

    match state.store().record_movement(&input).await {
        Ok(movement) => {
            let kind = movement.kind();
            tracing::info!(
                movement_id = %movement.id,
                kind = %kind,
                product_id = %movement.product_id,
                qty = movement.qty,
                "Movement recorded"
            );
            let message = format!("{kind} movement added successfully!");
            redirect_with(&session, Flash::success(message), "/movements").await
        }
        Err(e) => {
            let extra = if let Some(extra) = rejection_flashes(&e) {
                tracing::warn!(error = %e, "Movement not recorded");
                extra
            } else {
                tracing::error!(error = %e, "Failed to save movement");
                vec![Flash::error("Error saving movement. Please try again.")]
            };
            let flashes = flashes_with(&session, extra).await?;
            render_add(&state, flashes).await
        }
    }
}

async fn render_add(state: &AppState, flashes: Vec<Flash>) -> Result<Response> {
    let products = state.store().list_products().await?;
    let locations = state.store().list_locations().await?;

    Ok(MovementAddTemplate {
        flashes,
        products: OptionView::products(&products, None),
        locations: OptionView::locations(&locations, None),
    }
    .into_response())
}

/// GET /movements/edit/{id}
#[instrument(skip_all, fields(movement_id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let movement = find_movement(&state, &MovementId::new(id)).await?;
    render_edit(&state, &movement, take_flashes(&session).await?).await
}

/// POST /movements/edit/{id}
///
/// On any rejection the form is shown again with the stored values, which
/// are unchanged.
#[instrument(skip_all, fields(movement_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<MovementEditForm>,
) -> Result<Response> {
    let movement = find_movement(&state, &MovementId::new(id)).await?;

    let draft = match form.parse() {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected movement edit");
            let flashes = flashes_with(&session, [Flash::error(e.to_string())]).await?;
            return render_edit(&state, &movement, flashes).await;
        }
    };

    match state.store().amend_movement(&movement.id, &draft).await {
        Ok(updated) => {
            let kind = updated.kind();
            tracing::info!(
                movement_id = %updated.id,
                kind = %kind,
                qty = updated.qty,
                "Movement amended"
            );
            let message = format!("{kind} movement updated successfully!");
            redirect_with(&session, Flash::success(message), "/movements").await
        }
        Err(RepositoryError::NotFound) => Err(AppError::not_found("Movement", &movement.id)),
        Err(e) => {
            let extra = if let Some(extra) = rejection_flashes(&e) {
                tracing::warn!(error = %e, "Movement not amended");
                extra
            } else {
                tracing::error!(error = %e, "Failed to update movement");
                vec![Flash::error("Error updating movement. Please try again.")]
            };
            let flashes = flashes_with(&session, extra).await?;
            render_edit(&state, &movement, flashes).await
        }
    }
}

async fn render_edit(state: &AppState, movement: &Movement, flashes: Vec<Flash>) -> Result<Response> {
    let products = state.store().list_products().await?;
    let locations = state.store().list_locations().await?;
    let directory = Directory::new(&products, &locations);

    Ok(MovementEditTemplate {
        flashes,
        movement: MovementView::new(movement, &directory),
        products: OptionView::products(&products, Some(&movement.product_id)),
        from_locations: OptionView::locations(&locations, movement.from_location.as_ref()),
        to_locations: OptionView::locations(&locations, movement.to_location.as_ref()),
    }
    .into_response())
}

/// GET /movements/view/{id}
#[instrument(skip_all, fields(movement_id = %id))]
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<MovementDetailTemplate> {
    let movement = find_movement(&state, &MovementId::new(id)).await?;
    let directory = Directory::load(state.store()).await?;

    Ok(MovementDetailTemplate {
        flashes: take_flashes(&session).await?,
        movement: MovementView::new(&movement, &directory),
    })
}

#[cfg(test)]
mod tests {
    use stockbook_core::MovementError;

    use super::*;

    fn messages(err: &RepositoryError) -> Option<Vec<String>> {
        rejection_flashes(err).map(|flashes| flashes.into_iter().map(|f| f.message).collect())
    }

    #[test]
    fn test_each_rule_becomes_a_flash() {
        let err = RepositoryError::Invalid(vec![
            MovementError::NonPositiveQuantity,
            MovementError::SameLocation,
        ]);
        assert_eq!(
            messages(&err),
            Some(vec![
                "Quantity must be greater than 0".to_string(),
                "Cannot move from and to the same location".to_string(),
            ])
        );
    }

    #[test]
    fn test_conflict_and_reference_messages() {
        assert_eq!(
            messages(&RepositoryError::Conflict("movement id".into())),
            Some(vec!["Movement ID already exists!".to_string()])
        );
        assert_eq!(
            messages(&RepositoryError::UnknownReference("WH9".into())),
            Some(vec![UNKNOWN_REFERENCE.to_string()])
        );
    }

    #[test]
    fn test_storage_failures_are_not_user_rejections() {
        assert_eq!(messages(&RepositoryError::Storage("down".into())), None);
    }
}
