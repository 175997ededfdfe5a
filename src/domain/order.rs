use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One requested `(product, quantity)` pair, either sent by the buyer or read
/// from their cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl OrderLine {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Where the lines of an order come from.
#[derive(Debug, Clone)]
pub enum OrderSource {
    Lines(Vec<OrderLine>),
    Cart,
}

/// Product row as read (and locked) while validating an order.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    Applied,
    Insufficient,
}

/// Why a single order line could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFailure {
    ProductNotFound(Uuid),
    InsufficientStock { product_id: Uuid, name: String },
    InvalidQuantity { product_id: Uuid, quantity: i32 },
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineFailure::ProductNotFound(id) => write!(f, "product not found: {}", id),
            LineFailure::InsufficientStock { name, .. } => {
                write!(f, "insufficient stock for product: {}", name)
            }
            LineFailure::InvalidQuantity { product_id, .. } => {
                write!(f, "invalid quantity for product: {}", product_id)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    OnTheWay,
    Finished,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::OnTheWay => "ontheway",
            OrderStatus::Finished => "finished",
        }
    }

    /// Lifecycle: `pending -> accepted | rejected`, `accepted -> ontheway`,
    /// `ontheway -> finished`. Rejected and finished orders are terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::OnTheWay)
                | (OrderStatus::OnTheWay, OrderStatus::Finished)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "rejected" => Ok(OrderStatus::Rejected),
            "ontheway" => Ok(OrderStatus::OnTheWay),
            "finished" => Ok(OrderStatus::Finished),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// Result of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Line total captured when the order was placed.
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Rows to skip for a 1-based page. Saturates instead of overflowing.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit.max(0))
}

#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}
