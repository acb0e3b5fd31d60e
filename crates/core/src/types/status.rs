//! Status enums for catalog and order entities.

use serde::{Deserialize, Serialize};

/// Product stock status.
///
/// Maps to the Store API `stock_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

impl StockStatus {
    /// Whether a product with this status can be added to the cart.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        !matches!(self, Self::OutOfStock)
    }
}

/// Order status.
///
/// Maps to the WooCommerce order status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// Human-readable label for confirmation pages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending payment",
            Self::Processing => "Processing",
            Self::OnHold => "On hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
            Self::Failed => "Failed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_wire_values() {
        let parsed: StockStatus = serde_json::from_str("\"instock\"").unwrap();
        assert_eq!(parsed, StockStatus::InStock);
        let parsed: StockStatus = serde_json::from_str("\"outofstock\"").unwrap();
        assert_eq!(parsed, StockStatus::OutOfStock);
        let parsed: StockStatus = serde_json::from_str("\"onbackorder\"").unwrap();
        assert_eq!(parsed, StockStatus::OnBackorder);
    }

    #[test]
    fn test_stock_status_purchasable() {
        assert!(StockStatus::InStock.is_purchasable());
        assert!(StockStatus::OnBackorder.is_purchasable());
        assert!(!StockStatus::OutOfStock.is_purchasable());
    }

    #[test]
    fn test_order_status_wire_values() {
        let parsed: OrderStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(parsed, OrderStatus::OnHold);
        let parsed: OrderStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(parsed, OrderStatus::Processing);
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnHold).unwrap(),
            "\"on-hold\""
        );
    }

    #[test]
    fn test_order_status_label() {
        assert_eq!(OrderStatus::Processing.label(), "Processing");
        assert_eq!(OrderStatus::OnHold.label(), "On hold");
    }
}
