use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::ids::{CustomerID, OrderID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ModelError::InvalidStatus(raw.to_string()))
    }
}

/// Customer fields resolved onto an order row. Orders without a customer
/// carry empty strings, matching the left join they are read through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomerSummary {
    pub id: Option<CustomerID>,
    pub name: String,
    pub email: String,
}

/// Per-order line-item aggregates, computed for the ids of a single page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderTotals {
    /// `SUM(quantity * price)`
    pub total_value: f64,
    /// `SUM(quantity)`
    pub total_quantity: f64,
    /// `COUNT(DISTINCT product_color)`
    pub total_product_colors: i64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OrderListItem {
    pub id: OrderID,
    pub status: OrderStatus,
    pub customer: CustomerSummary,
    pub total_value: f64,
    pub total_quantity: f64,
    pub total_product_colors: i64,
    pub average_value_per_unit: f64,
    pub average_value_per_product_color: f64,
}
