//! Newtype identifiers for type-safe entity references.
//!
//! Products, locations and movements are keyed by short codes assigned by
//! the user (`PROD001`, `WH001`, `MOV017`). Use the `define_code!` macro to
//! create a wrapper per entity so a location code can never be passed where a
//! product code is expected.

use thiserror::Error;

/// Maximum length of any identifier, matching the `VARCHAR(50)` columns.
pub const MAX_CODE_LEN: usize = 50;

/// Errors raised when a submitted form field fails its basic shape checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field was empty after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// The field exceeds its column width.
    #[error("{0} must be at most {1} characters")]
    TooLong(&'static str, usize),

    /// The field holds a character outside the code alphabet.
    #[error("{0} may only contain letters, digits, hyphens and underscores")]
    InvalidChars(&'static str),
}

/// Characters allowed in a code. Codes appear as bare URL path segments, so
/// reserved characters such as `/`, `?` and `#` are excluded.
#[must_use]
pub fn is_code_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Macro to define a type-safe code wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()` for trusted values and `parse()` for user input
/// - `Display` and `AsRef<str>`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// Ordering is byte-wise lexicographic on the underlying string.
///
/// # Example
///
/// ```rust
/// # use stockbook_core::define_code;
/// define_code!(BinId, "Bin ID");
///
/// let bin = BinId::parse("  B-07 ").unwrap();
/// assert_eq!(bin.as_str(), "B-07");
/// assert!(BinId::parse("   ").is_err());
/// ```
#[macro_export]
macro_rules! define_code {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Human-readable field label used in validation messages.
            pub const LABEL: &'static str = $label;

            /// Wrap a value that is already known to be valid (e.g. read from storage).
            #[must_use]
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Parse user input: trims whitespace, rejects empty, over-long and
            /// non-code values.
            ///
            /// # Errors
            ///
            /// Returns `FieldError` if the trimmed value is empty, longer than
            /// `MAX_CODE_LEN` characters, or contains anything but letters,
            /// digits, `-` and `_`.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::FieldError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::FieldError::Required($label));
                }
                if trimmed.chars().count() > $crate::MAX_CODE_LEN {
                    return Err($crate::FieldError::TooLong($label, $crate::MAX_CODE_LEN));
                }
                if !trimmed.chars().all($crate::is_code_char) {
                    return Err($crate::FieldError::InvalidChars($label));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying code.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying code.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let code = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(code))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_code!(ProductId, "Product ID");
define_code!(LocationId, "Location ID");
define_code!(MovementId, "Movement ID");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductId::parse("  PROD001\t").unwrap();
        assert_eq!(id.as_str(), "PROD001");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(
            LocationId::parse("   "),
            Err(FieldError::Required("Location ID"))
        );
        assert_eq!(
            FieldError::Required(MovementId::LABEL).to_string(),
            "Movement ID is required"
        );
    }

    #[test]
    fn test_parse_rejects_over_long() {
        let raw = "X".repeat(MAX_CODE_LEN + 1);
        assert_eq!(
            ProductId::parse(&raw),
            Err(FieldError::TooLong("Product ID", MAX_CODE_LEN))
        );
        assert!(ProductId::parse(&"X".repeat(MAX_CODE_LEN)).is_ok());
    }

    #[test]
    fn test_parse_rejects_url_reserved_characters() {
        for raw in ["P/1", "A?B", "x#y", "A B", "50%", "."] {
            assert_eq!(
                ProductId::parse(raw),
                Err(FieldError::InvalidChars("Product ID")),
                "{raw:?}"
            );
        }
        assert_eq!(LocationId::parse(" WH-01_a ").unwrap().as_str(), "WH-01_a");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ids = vec![
            LocationId::new("WH002"),
            LocationId::new("STORE01"),
            LocationId::new("WH001"),
        ];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(LocationId::as_str).collect();
        assert_eq!(ordered, ["STORE01", "WH001", "WH002"]);
    }

    #[test]
    fn test_display_is_bare_code() {
        assert_eq!(MovementId::new("MOV001").to_string(), "MOV001");
    }
}
