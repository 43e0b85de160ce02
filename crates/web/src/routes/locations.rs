//! Storage location route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use stockbook_core::{Location, LocationId};

use super::forms::{LocationEditForm, LocationForm};
use super::views::{Directory, LocationView, MovementView};
use super::{flashes_with, redirect_with};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, take_flashes};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "locations/index.html")]
pub struct LocationsIndexTemplate {
    pub flashes: Vec<Flash>,
    pub locations: Vec<LocationView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "locations/add.html")]
pub struct LocationAddTemplate {
    pub flashes: Vec<Flash>,
}

#[derive(Template, WebTemplate)]
#[template(path = "locations/edit.html")]
pub struct LocationEditTemplate {
    pub flashes: Vec<Flash>,
    pub location: LocationView,
}

/// Location detail: movements arriving at and leaving the location.
#[derive(Template, WebTemplate)]
#[template(path = "locations/view.html")]
pub struct LocationDetailTemplate {
    pub flashes: Vec<Flash>,
    pub location: LocationView,
    pub incoming: Vec<MovementView>,
    pub outgoing: Vec<MovementView>,
}

async fn find_location(state: &AppState, id: &LocationId) -> Result<Location> {
    state
        .store()
        .get_location(id)
        .await?
        .ok_or_else(|| AppError::not_found("Location", id))
}

/// GET /locations
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<LocationsIndexTemplate> {
    let locations = state.store().list_locations().await?;

    Ok(LocationsIndexTemplate {
        flashes: take_flashes(&session).await?,
        locations: locations.iter().map(LocationView::from).collect(),
    })
}

/// GET /locations/add
#[instrument(skip_all)]
pub async fn add_form(session: Session) -> Result<LocationAddTemplate> {
    Ok(LocationAddTemplate {
        flashes: take_flashes(&session).await?,
    })
}

/// POST /locations/add
#[instrument(skip_all, fields(location_id = %form.location_id.trim()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LocationForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected location form");
            return redisplay_add(&session, e.to_string()).await;
        }
    };

    match state.store().create_location(&input).await {
        Ok(location) => {
            tracing::info!(location_id = %location.id, "Location added");
            redirect_with(
                &session,
                Flash::success("Location added successfully!"),
                "/locations",
            )
            .await
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::warn!(location_id = %input.id, "Duplicate location id");
            redisplay_add(&session, "Location ID already exists!").await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save location");
            redisplay_add(&session, "Error saving location. Please try again.").await
        }
    }
}

async fn redisplay_add(session: &Session, message: impl Into<String>) -> Result<Response> {
    Ok(LocationAddTemplate {
        flashes: flashes_with(session, [Flash::error(message)]).await?,
    }
    .into_response())
}

/// GET /locations/edit/{id}
#[instrument(skip_all, fields(location_id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<LocationEditTemplate> {
    let location = find_location(&state, &LocationId::new(id)).await?;

    Ok(LocationEditTemplate {
        flashes: take_flashes(&session).await?,
        location: LocationView::from(&location),
    })
}

/// POST /locations/edit/{id}
#[instrument(skip_all, fields(location_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<LocationEditForm>,
) -> Result<Response> {
    let location = find_location(&state, &LocationId::new(id)).await?;

    let update = match form.parse() {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected location edit");
            return redisplay_edit(&session, &location, e.to_string()).await;
        }
    };

    match state.store().update_location(&location.id, &update).await {
        Ok(updated) => {
            tracing::info!(location_id = %updated.id, "Location updated");
            redirect_with(
                &session,
                Flash::success("Location updated successfully!"),
                "/locations",
            )
            .await
        }
        Err(RepositoryError::NotFound) => Err(AppError::not_found("Location", &location.id)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update location");
            redisplay_edit(
                &session,
                &location,
                "Error updating location. Please try again.",
            )
            .await
        }
    }
}

async fn redisplay_edit(
    session: &Session,
    location: &Location,
    message: impl Into<String>,
) -> Result<Response> {
    Ok(LocationEditTemplate {
        flashes: flashes_with(session, [Flash::error(message)]).await?,
        location: LocationView::from(location),
    }
    .into_response())
}

/// GET /locations/view/{id}
#[instrument(skip_all, fields(location_id = %id))]
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<LocationDetailTemplate> {
    let location = find_location(&state, &LocationId::new(id)).await?;
    let movements = state.store().movements_for_location(&location.id).await?;
    let directory = Directory::load(state.store()).await?;

    Ok(LocationDetailTemplate {
        flashes: take_flashes(&session).await?,
        location: LocationView::from(&location),
        incoming: MovementView::list(&movements.incoming, &directory),
        outgoing: MovementView::list(&movements.outgoing, &directory),
    })
}
