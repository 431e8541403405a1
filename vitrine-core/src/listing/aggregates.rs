//! Per-page derived values attached to hydrated entities.

use vitrine_model::{OrderListItem, OrderTotals, ProductColorListItem};

use crate::database::ports::orders::OrderRecord;
use crate::database::ports::product_colors::ProductColorRecord;

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round2(numerator / denominator)`, or `0.0` for a non-positive
/// denominator.
pub fn average(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        round2(numerator / denominator)
    } else {
        0.0
    }
}

pub fn product_color_item(
    record: ProductColorRecord,
    min_price: Option<f64>,
) -> ProductColorListItem {
    record.into_list_item(min_price.unwrap_or(0.0))
}

/// Attach line-item totals and the two derived averages to an order.
/// Orders without line items get all-zero aggregates.
pub fn order_item(
    record: OrderRecord,
    totals: Option<OrderTotals>,
) -> OrderListItem {
    let totals = totals.unwrap_or_default();
    OrderListItem {
        id: record.id,
        status: record.status,
        customer: record.customer,
        total_value: totals.total_value,
        total_quantity: totals.total_quantity,
        total_product_colors: totals.total_product_colors,
        average_value_per_unit: average(
            totals.total_value,
            totals.total_quantity,
        ),
        average_value_per_product_color: average(
            totals.total_value,
            totals.total_product_colors as f64,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_model::{CustomerSummary, OrderID, OrderStatus};

    fn record() -> OrderRecord {
        OrderRecord {
            id: OrderID::new(),
            status: OrderStatus::Pending,
            customer: CustomerSummary::default(),
        }
    }

    #[test]
    fn rounds_half_up_to_cents() {
        assert_eq!(round2(8.333_333), 8.33);
        assert_eq!(round2(12.5), 12.5);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.675_000_1), 2.68);
    }

    #[test]
    fn averages_over_units_and_product_colors() {
        let totals = OrderTotals {
            total_value: 25.0,
            total_quantity: 3.0,
            total_product_colors: 2,
        };
        let item = order_item(record(), Some(totals));

        assert_eq!(item.total_value, 25.0);
        assert_eq!(item.total_quantity, 3.0);
        assert_eq!(item.average_value_per_unit, 8.33);
        assert_eq!(item.average_value_per_product_color, 12.5);
    }

    #[test]
    fn averages_are_zero_without_items() {
        let item = order_item(record(), None);
        assert_eq!(item.total_value, 0.0);
        assert_eq!(item.total_product_colors, 0);
        assert_eq!(item.average_value_per_unit, 0.0);
        assert_eq!(item.average_value_per_product_color, 0.0);
    }
}
