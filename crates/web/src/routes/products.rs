//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use stockbook_core::{Product, ProductId};

use super::forms::{ProductEditForm, ProductForm};
use super::views::{Directory, MovementView, ProductView};
use super::{flashes_with, redirect_with};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, take_flashes};
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub flashes: Vec<Flash>,
    pub products: Vec<ProductView>,
}

/// Add product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/add.html")]
pub struct ProductAddTemplate {
    pub flashes: Vec<Flash>,
}

/// Edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct ProductEditTemplate {
    pub flashes: Vec<Flash>,
    pub product: ProductView,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/view.html")]
pub struct ProductDetailTemplate {
    pub flashes: Vec<Flash>,
    pub product: ProductView,
    pub movements: Vec<MovementView>,
}

async fn find_product(state: &AppState, id: &ProductId) -> Result<Product> {
    state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))
}

/// GET /products
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductsIndexTemplate> {
    let products = state.store().list_products().await?;

    Ok(ProductsIndexTemplate {
        flashes: take_flashes(&session).await?,
        products: products.iter().map(ProductView::from).collect(),
    })
}

/// GET /products/add
#[instrument(skip_all)]
pub async fn add_form(session: Session) -> Result<ProductAddTemplate> {
    Ok(ProductAddTemplate {
        flashes: take_flashes(&session).await?,
    })
}

/// POST /products/add
#[instrument(skip_all, fields(product_id = %form.product_id.trim()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected product form");
            return redisplay_add(&session, e.to_string()).await;
        }
    };

    match state.store().create_product(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product added");
            redirect_with(&session, Flash::success("Product added successfully!"), "/products")
                .await
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::warn!(product_id = %input.id, "Duplicate product id");
            redisplay_add(&session, "Product ID already exists!").await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save product");
            redisplay_add(&session, "Error saving product. Please try again.").await
        }
    }
}

async fn redisplay_add(session: &Session, message: impl Into<String>) -> Result<Response> {
    Ok(ProductAddTemplate {
        flashes: flashes_with(session, [Flash::error(message)]).await?,
    }
    .into_response())
}

/// GET /products/edit/{id}
#[instrument(skip_all, fields(product_id = %id))]
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<ProductEditTemplate> {
    let product = find_product(&state, &ProductId::new(id)).await?;

    Ok(ProductEditTemplate {
        flashes: take_flashes(&session).await?,
        product: ProductView::from(&product),
    })
}

/// POST /products/edit/{id}
#[instrument(skip_all, fields(product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ProductEditForm>,
) -> Result<Response> {
    let product = find_product(&state, &ProductId::new(id)).await?;

    let update = match form.parse() {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected product edit");
            return redisplay_edit(&session, &product, e.to_string()).await;
        }
    };

    match state.store().update_product(&product.id, &update).await {
        Ok(updated) => {
            tracing::info!(product_id = %updated.id, "Product updated");
            redirect_with(
                &session,
                Flash::success("Product updated successfully!"),
                "/products",
            )
            .await
        }
        Err(RepositoryError::NotFound) => Err(AppError::not_found("Product", &product.id)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update product");
            redisplay_edit(&session, &product, "Error updating product. Please try again.").await
        }
    }
}

async fn redisplay_edit(
    session: &Session,
    product: &Product,
    message: impl Into<String>,
) -> Result<Response> {
    Ok(ProductEditTemplate {
        flashes: flashes_with(session, [Flash::error(message)]).await?,
        product: ProductView::from(product),
    }
    .into_response())
}

/// GET /products/view/{id}
#[instrument(skip_all, fields(product_id = %id))]
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<ProductDetailTemplate> {
    let product = find_product(&state, &ProductId::new(id)).await?;
    let movements = state.store().movements_for_product(&product.id).await?;
    let directory = Directory::load(state.store()).await?;

    Ok(ProductDetailTemplate {
        flashes: take_flashes(&session).await?,
        product: ProductView::from(&product),
        movements: MovementView::list(&movements, &directory),
    })
}
