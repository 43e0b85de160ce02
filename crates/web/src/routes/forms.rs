//! Typed request bodies for the HTML forms.
//!
//! Every field arrives as text. Missing fields default to empty strings so a
//! stripped-down post gets the same "is required" feedback as a blank one,
//! and blank optional fields become `None`.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use stockbook_core::{
    FieldError, LocationId, LocationUpdate, MovementDraft, MovementId, NewLocation, NewMovement,
    NewProduct, ProductId, ProductUpdate, parse_name, parse_notes,
};

/// A form submission that cannot be turned into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Quantity must be a valid number!")]
    Quantity,
}

/// Treat empty or whitespace-only optional fields as absent.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn parse_qty(raw: &str) -> Result<i32, FormError> {
    raw.trim().parse::<i32>().map_err(|_| FormError::Quantity)
}

fn parse_location(raw: Option<&str>) -> Result<Option<LocationId>, FieldError> {
    raw.map(LocationId::parse).transpose()
}

// =============================================================================
// Products
// =============================================================================

/// `POST /products/add`
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns the first field that fails its shape check.
    pub fn parse(&self) -> Result<NewProduct, FormError> {
        Ok(NewProduct {
            id: ProductId::parse(&self.product_id)?,
            name: parse_name("Product name", &self.name)?,
            description: parse_notes(self.description.as_deref()),
        })
    }
}

/// `POST /products/edit/{id}`
#[derive(Debug, Deserialize)]
pub struct ProductEditForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
}

impl ProductEditForm {
    /// # Errors
    ///
    /// Returns `FormError::Field` for a blank or over-long name.
    pub fn parse(&self) -> Result<ProductUpdate, FormError> {
        Ok(ProductUpdate {
            name: parse_name("Product name", &self.name)?,
            description: parse_notes(self.description.as_deref()),
        })
    }
}

// =============================================================================
// Locations
// =============================================================================

/// `POST /locations/add`
#[derive(Debug, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
}

impl LocationForm {
    /// # Errors
    ///
    /// Returns the first field that fails its shape check.
    pub fn parse(&self) -> Result<NewLocation, FormError> {
        Ok(NewLocation {
            id: LocationId::parse(&self.location_id)?,
            name: parse_name("Location name", &self.name)?,
            address: parse_notes(self.address.as_deref()),
        })
    }
}

/// `POST /locations/edit/{id}`
#[derive(Debug, Deserialize)]
pub struct LocationEditForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
}

impl LocationEditForm {
    /// # Errors
    ///
    /// Returns `FormError::Field` for a blank or over-long name.
    pub fn parse(&self) -> Result<LocationUpdate, FormError> {
        Ok(LocationUpdate {
            name: parse_name("Location name", &self.name)?,
            address: parse_notes(self.address.as_deref()),
        })
    }
}

// =============================================================================
// Movements
// =============================================================================

/// `POST /movements/add`
#[derive(Debug, Deserialize)]
pub struct MovementForm {
    #[serde(default)]
    pub movement_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_location: Option<String>,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub qty: String,
}

impl MovementForm {
    /// Shape-check the fields. Ledger rules are applied by the store.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Quantity` for a non-numeric quantity, otherwise
    /// the first identifier that fails its shape check.
    pub fn parse(&self) -> Result<NewMovement, FormError> {
        let qty = parse_qty(&self.qty)?;
        Ok(NewMovement {
            id: MovementId::parse(&self.movement_id)?,
            timestamp: None,
            draft: MovementDraft {
                from_location: parse_location(self.from_location.as_deref())?,
                to_location: parse_location(self.to_location.as_deref())?,
                product_id: ProductId::parse(&self.product_id)?,
                qty,
            },
        })
    }
}

/// `POST /movements/edit/{id}`
#[derive(Debug, Deserialize)]
pub struct MovementEditForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub from_location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub to_location: Option<String>,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub qty: String,
}

impl MovementEditForm {
    /// # Errors
    ///
    /// Same as [`MovementForm::parse`].
    pub fn parse(&self) -> Result<MovementDraft, FormError> {
        let qty = parse_qty(&self.qty)?;
        Ok(MovementDraft {
            from_location: parse_location(self.from_location.as_deref())?,
            to_location: parse_location(self.to_location.as_deref())?,
            product_id: ProductId::parse(&self.product_id)?,
            qty,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Form, body::Body, extract::FromRequest, http::Request};

    use super::*;

    async fn decode<T: serde::de::DeserializeOwned>(body: &'static str) -> T {
        let request = Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let Form(form) = Form::<T>::from_request(request, &()).await.unwrap();
        form
    }

    #[tokio::test]
    async fn test_blank_locations_become_none() {
        let form: MovementForm =
            decode("movement_id=MOV100&from_location=&to_location=WH001&product_id=PROD001&qty=12")
                .await;
        let movement = form.parse().unwrap();

        assert_eq!(movement.id.as_str(), "MOV100");
        assert_eq!(movement.draft.from_location, None);
        assert_eq!(movement.draft.to_location, Some(LocationId::new("WH001")));
        assert_eq!(movement.draft.qty, 12);
        assert!(movement.timestamp.is_none());
    }

    #[tokio::test]
    async fn test_malformed_qty() {
        let form: MovementEditForm = decode("to_location=WH001&product_id=PROD001&qty=ten").await;
        assert_eq!(form.parse().unwrap_err(), FormError::Quantity);
        assert_eq!(
            FormError::Quantity.to_string(),
            "Quantity must be a valid number!"
        );
    }

    #[tokio::test]
    async fn test_non_positive_qty_is_left_to_the_ledger_rules() {
        let form: MovementEditForm = decode("to_location=WH001&product_id=PROD001&qty=-4").await;
        assert_eq!(form.parse().unwrap().qty, -4);
    }

    #[tokio::test]
    async fn test_missing_fields_are_required_errors() {
        let form: ProductForm = decode("name=Laptop").await;
        assert_eq!(
            form.parse().unwrap_err().to_string(),
            "Product ID is required"
        );

        let form: LocationForm = decode("location_id=WH001&name=%20%20").await;
        assert_eq!(
            form.parse().unwrap_err().to_string(),
            "Location name is required"
        );
    }

    #[tokio::test]
    async fn test_blank_description_is_none() {
        let form: ProductEditForm = decode("name=Monitor&description=%20").await;
        let update = form.parse().unwrap();
        assert_eq!(update.name, "Monitor");
        assert_eq!(update.description, None);
    }
}
