use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::id::RecordId;
use super::status::OrderStatus;

/// One requested cart entry, exactly as the caller sent it.
#[derive(Debug, Clone, Default)]
pub struct CartLine {
    pub menu_item: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceOrder {
    pub customer_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub items: Vec<CartLine>,
    pub delivery_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub id: RecordId,
    pub menu_item_id: RecordId,
    pub quantity: i32,
}

/// A fully validated, priced order ready to be written as one aggregate.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: RecordId,
    pub customer_id: RecordId,
    pub restaurant_id: RecordId,
    pub total_amount: BigDecimal,
    pub delivery_time: Option<DateTime<Utc>>,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub id: RecordId,
    pub order_id: RecordId,
    pub menu_item_id: RecordId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: RecordId,
    pub customer_id: RecordId,
    pub restaurant_id: RecordId,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub delivery_time: Option<DateTime<Utc>>,
    pub delivery_personnel_id: Option<RecordId>,
    pub items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a status update; `changed` is false when the order already
/// had the requested status.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order: Order,
    pub changed: bool,
}
