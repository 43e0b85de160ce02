//! Products and storage locations.

use serde::{Deserialize, Serialize};

use super::id::{FieldError, LocationId, ProductId};

/// Maximum length of a product or location display name.
pub const MAX_NAME_LEN: usize = 100;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
}

/// Input for adding a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
}

/// Replacement values for an existing product. The identifier never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
}

/// A storage location (warehouse, store, shelf...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
}

/// Input for adding a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
}

/// Replacement values for an existing location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationUpdate {
    pub name: String,
    pub address: Option<String>,
}

impl From<NewProduct> for Product {
    fn from(input: NewProduct) -> Self {
        Self {
            id: input.id,
            name: input.name,
            description: input.description,
        }
    }
}

impl From<NewLocation> for Location {
    fn from(input: NewLocation) -> Self {
        Self {
            id: input.id,
            name: input.name,
            address: input.address,
        }
    }
}

/// Validate a required display name.
///
/// # Errors
///
/// Returns `FieldError::Required` for a blank name and `FieldError::TooLong`
/// past `MAX_NAME_LEN` characters.
pub fn parse_name(label: &'static str, raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required(label));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::TooLong(label, MAX_NAME_LEN));
    }
    Ok(trimmed.to_owned())
}

/// Normalize optional free text: blank input is stored as `None`.
#[must_use]
pub fn parse_notes(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}
