use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ModelError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        pub struct $name(pub Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(raw.trim())
                    .map($name)
                    .map_err(|_| ModelError::InvalidId(raw.to_string()))
            }
        }
    };
}

entity_id!(
    /// Primary key of a `products` row (the parent of a product color).
    ProductID
);
entity_id!(ColorID);
entity_id!(
    /// Primary key of a `product_colors` row; the paged entity of the
    /// catalog listing and its keyset cursor.
    ProductColorID
);
entity_id!(SkuID);
entity_id!(CustomerID);
entity_id!(
    /// Primary key of an `orders` row; the paged entity of the order
    /// listing and its keyset cursor.
    OrderID
);

/// Join a slice of ids into plain uuids for `= ANY($1)` binds.
pub fn to_uuids<T: AsRef<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid_with_whitespace() {
        let raw = " 0190b7d2-6c1e-7cc4-9d2a-6f0e3b9b1a10 ";
        let id: OrderID = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw.trim());
    }

    #[test]
    fn rejects_garbage_id() {
        let err = "not-a-uuid".parse::<OrderID>().unwrap_err();
        assert_eq!(err, ModelError::InvalidId("not-a-uuid".into()));
        assert_eq!(err.to_string(), "invalid id: not-a-uuid");
    }

    #[test]
    fn ids_order_like_their_uuids() {
        let low = ProductColorID(Uuid::from_u128(1));
        let high = ProductColorID(Uuid::from_u128(2));
        assert!(low < high);
    }
}
