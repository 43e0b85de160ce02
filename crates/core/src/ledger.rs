//! The stock movement ledger.
//!
//! A movement transfers a positive quantity of one product out of a source
//! location, into a destination location, or both:
//!
//! | from | to  | kind       |
//! |------|-----|------------|
//! | -    | yes | Stock In   |
//! | yes  | -   | Stock Out  |
//! | yes  | yes | Transfer   |
//!
//! [`validate`] is the only gate a movement passes before it is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LocationId, MovementId, ProductId};

/// A rule a candidate movement breaks.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MovementError {
    #[error("At least one location (from or to) must be specified")]
    MissingLocation,

    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,

    #[error("Cannot move from and to the same location")]
    SameLocation,
}

/// Direction of a movement relative to the tracked locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Only a destination: stock enters the system.
    StockIn,
    /// Only a source: stock leaves the system.
    StockOut,
    /// Both source and destination.
    Transfer,
}

impl MovementKind {
    /// Classify by which locations are present.
    ///
    /// Returns `None` when neither is set; [`validate`] rejects such movements.
    #[must_use]
    pub const fn classify(from: Option<&LocationId>, to: Option<&LocationId>) -> Option<Self> {
        match (from, to) {
            (None, Some(_)) => Some(Self::StockIn),
            (Some(_), None) => Some(Self::StockOut),
            (Some(_), Some(_)) => Some(Self::Transfer),
            (None, None) => None,
        }
    }

    /// Label used in page text and flash messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StockIn => "Stock In",
            Self::StockOut => "Stock Out",
            Self::Transfer => "Transfer",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The editable fields of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: i32,
}

impl MovementDraft {
    /// Check this draft against the ledger rules. See [`validate`].
    #[must_use]
    pub fn validate(&self) -> Vec<MovementError> {
        validate(self)
    }

    /// Classify this draft, if it has at least one location.
    #[must_use]
    pub const fn kind(&self) -> Option<MovementKind> {
        MovementKind::classify(self.from_location.as_ref(), self.to_location.as_ref())
    }
}

/// Input for recording a new movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub id: MovementId,
    /// Explicit timestamp (seed data, imports). `None` means "now".
    pub timestamp: Option<DateTime<Utc>>,
    pub draft: MovementDraft,
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: i32,
}

impl Movement {
    /// Build a stored movement from an accepted draft.
    #[must_use]
    pub fn from_draft(id: MovementId, timestamp: DateTime<Utc>, draft: MovementDraft) -> Self {
        Self {
            id,
            timestamp,
            from_location: draft.from_location,
            to_location: draft.to_location,
            product_id: draft.product_id,
            qty: draft.qty,
        }
    }

    /// Replace the editable fields, keeping identifier and timestamp.
    pub fn apply(&mut self, draft: MovementDraft) {
        self.from_location = draft.from_location;
        self.to_location = draft.to_location;
        self.product_id = draft.product_id;
        self.qty = draft.qty;
    }

    /// The editable fields of this movement.
    #[must_use]
    pub fn draft(&self) -> MovementDraft {
        MovementDraft {
            from_location: self.from_location.clone(),
            to_location: self.to_location.clone(),
            product_id: self.product_id.clone(),
            qty: self.qty,
        }
    }

    /// Classification for display.
    ///
    /// Stored rows always carry a location; a row without one is labelled a
    /// transfer.
    #[must_use]
    pub const fn kind(&self) -> MovementKind {
        match MovementKind::classify(self.from_location.as_ref(), self.to_location.as_ref()) {
            Some(kind) => kind,
            None => MovementKind::Transfer,
        }
    }
}

/// Check a candidate movement against every ledger rule.
///
/// All broken rules are reported, in rule order; an empty vector means the
/// movement may be written. Product existence is not checked here.
#[must_use]
pub fn validate(draft: &MovementDraft) -> Vec<MovementError> {
    let mut errors = Vec::new();

    if draft.from_location.is_none() && draft.to_location.is_none() {
        errors.push(MovementError::MissingLocation);
    }

    if draft.qty <= 0 {
        errors.push(MovementError::NonPositiveQuantity);
    }

    if let (Some(from), Some(to)) = (&draft.from_location, &draft.to_location)
        && from == to
    {
        errors.push(MovementError::SameLocation);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft(from: Option<&str>, to: Option<&str>, qty: i32) -> MovementDraft {
        MovementDraft {
            from_location: from.map(LocationId::new),
            to_location: to.map(LocationId::new),
            product_id: ProductId::new("PROD001"),
            qty,
        }
    }

    #[test]
    fn test_valid_movements() {
        assert!(validate(&draft(None, Some("WH001"), 10)).is_empty());
        assert!(validate(&draft(Some("WH001"), None, 1)).is_empty());
        assert!(validate(&draft(Some("WH001"), Some("STORE01"), 4)).is_empty());
    }

    #[test]
    fn test_reports_every_failure() {
        assert_eq!(
            validate(&draft(None, None, 0)),
            vec![
                MovementError::MissingLocation,
                MovementError::NonPositiveQuantity
            ]
        );
        assert_eq!(
            validate(&draft(Some("WH001"), Some("WH001"), -3)),
            vec![
                MovementError::NonPositiveQuantity,
                MovementError::SameLocation
            ]
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MovementError::MissingLocation.to_string(),
            "At least one location (from or to) must be specified"
        );
        assert_eq!(
            MovementError::NonPositiveQuantity.to_string(),
            "Quantity must be greater than 0"
        );
        assert_eq!(
            MovementError::SameLocation.to_string(),
            "Cannot move from and to the same location"
        );
    }

    #[test]
    fn test_classify() {
        let wh = LocationId::new("WH001");
        let store = LocationId::new("STORE01");
        assert_eq!(
            MovementKind::classify(None, Some(&wh)),
            Some(MovementKind::StockIn)
        );
        assert_eq!(
            MovementKind::classify(Some(&wh), None),
            Some(MovementKind::StockOut)
        );
        assert_eq!(
            MovementKind::classify(Some(&wh), Some(&store)),
            Some(MovementKind::Transfer)
        );
        assert_eq!(MovementKind::classify(None, None), None);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(MovementKind::StockIn.to_string(), "Stock In");
        assert_eq!(MovementKind::StockOut.to_string(), "Stock Out");
        assert_eq!(MovementKind::Transfer.to_string(), "Transfer");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let ts = DateTime::<Utc>::UNIX_EPOCH;
        let mut movement = Movement::from_draft(
            MovementId::new("MOV001"),
            ts,
            draft(None, Some("WH001"), 50),
        );
        movement.apply(draft(Some("WH001"), Some("STORE01"), 5));

        assert_eq!(movement.id.as_str(), "MOV001");
        assert_eq!(movement.timestamp, ts);
        assert_eq!(movement.qty, 5);
        assert_eq!(movement.kind(), MovementKind::Transfer);
        assert_eq!(movement.draft(), draft(Some("WH001"), Some("STORE01"), 5));
    }

    fn location() -> impl Strategy<Value = Option<LocationId>> {
        prop::option::of(prop::sample::select(vec!["WH001", "WH002", "STORE01"]))
            .prop_map(|code| code.map(LocationId::new))
    }

    proptest! {
        #[test]
        fn prop_invalid_iff_a_rule_is_broken(
            from in location(),
            to in location(),
            qty in -5i32..20,
        ) {
            let candidate = MovementDraft {
                from_location: from.clone(),
                to_location: to.clone(),
                product_id: ProductId::new("PROD001"),
                qty,
            };
            let broken = (from.is_none() && to.is_none())
                || qty <= 0
                || matches!((&from, &to), (Some(f), Some(t)) if f == t);

            prop_assert_eq!(!validate(&candidate).is_empty(), broken);
        }

        #[test]
        fn prop_valid_drafts_always_classify(
            from in location(),
            to in location(),
            qty in 1i32..1000,
        ) {
            let candidate = MovementDraft {
                from_location: from,
                to_location: to,
                product_id: ProductId::new("PROD001"),
                qty,
            };
            if validate(&candidate).is_empty() {
                prop_assert!(candidate.kind().is_some());
            }
        }
    }
}
