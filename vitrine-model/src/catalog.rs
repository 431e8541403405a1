use chrono::{DateTime, Utc};

use crate::ids::{ColorID, ProductColorID, ProductID};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductSummary {
    pub id: ProductID,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSummary {
    pub id: ColorID,
    pub name: String,
    pub code: Option<String>,
}

/// Catalog listing entry: a product color with its resolved parent product,
/// its color and the minimum price across its SKUs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProductColorListItem {
    pub id: ProductColorID,
    pub product: ProductSummary,
    pub color: ColorSummary,
    /// `0.0` when the product color has no SKUs.
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
