//! Request and response types for [`OrderService`](super::OrderService).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cafe_core::order::DetachedVoucher;
use cafe_core::{Order, OrderType};

/// Opens a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_type: OrderType,

    /// Required for dine-in orders.
    #[serde(default)]
    pub table_id: Option<String>,

    #[serde(default)]
    pub customer_id: Option<String>,

    /// Applied on a best-effort basis: a code that does not qualify is
    /// dropped and reported in [`OrderDetail::detached_voucher`].
    #[serde(default)]
    pub voucher_code: Option<String>,

    #[serde(default)]
    pub items: Vec<AddItemRequest>,
}

impl CreateOrderRequest {
    pub fn takeaway(items: Vec<AddItemRequest>) -> Self {
        CreateOrderRequest {
            order_type: OrderType::Takeaway,
            table_id: None,
            customer_id: None,
            voucher_code: None,
            items,
        }
    }

    pub fn dine_in(table_id: impl Into<String>, items: Vec<AddItemRequest>) -> Self {
        CreateOrderRequest {
            order_type: OrderType::DineIn,
            table_id: Some(table_id.into()),
            customer_id: None,
            voucher_code: None,
            items,
        }
    }
}

/// Adds a product to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl AddItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        AddItemRequest {
            product_id: product_id.into(),
            quantity,
            note: None,
        }
    }
}

/// Replaces the quantity and note of an order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// One ingredient line of a goods receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    pub ingredient_id: String,
    pub quantity: Decimal,
}

/// Stock-take correction to an absolute quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub ingredient_id: String,
    pub new_quantity: Decimal,
    pub reason: String,
}

/// Full order snapshot returned by every order operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,

    /// Voucher dropped during this operation because it no longer
    /// qualified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached_voucher: Option<DetachedVoucher>,

    /// Points credited to the customer by this payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_points_earned: Option<i64>,
}

impl OrderDetail {
    pub fn new(order: Order) -> Self {
        OrderDetail {
            order,
            detached_voucher: None,
            loyalty_points_earned: None,
        }
    }

    pub(crate) fn with_detached(mut self, detached: Option<DetachedVoucher>) -> Self {
        self.detached_voucher = detached;
        self
    }
}

impl From<Order> for OrderDetail {
    fn from(order: Order) -> Self {
        OrderDetail::new(order)
    }
}
