use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub lines: Vec<OrderLineInput>,
}

/// `lines`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<OrderLineInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
}

impl OrderLine {
    pub fn from_input(input: &OrderLineInput) -> Self {
        OrderLine { id: Uuid::new_v4(), product_id: input.product_id, quantity: input.quantity, unit_price: input.unit_price }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: Uuid, user_id: Uuid, lines: Vec<OrderLine>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        let total = total(&lines);
        Order { id, user_id, lines, total, created_at, updated_at }
    }
}

pub fn total(lines: &[OrderLine]) -> f64 {
    lines.iter().map(|l| l.quantity as f64 * l.unit_price).sum()
}

pub fn validate_lines(lines: &[OrderLineInput]) -> Result<(), ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::BadRequest("order must have at least one line".into()));
    }
    for line in lines {
        models::order_line::validate_line(line.quantity, line.unit_price)?;
    }
    Ok(())
}

pub fn validate_patch(patch: &OrderPatch) -> Result<(), ServiceError> {
    match &patch.lines {
        Some(lines) => validate_lines(lines),
        None => Ok(()),
    }
}

pub struct OrderResource;

impl Resource for OrderResource {
    const NAME: &'static str = "Order";
    type Id = Uuid;
    type Item = Order;
    type New = NewOrder;
    type Patch = OrderPatch;
}
