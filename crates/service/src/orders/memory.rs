use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::BoxStream;
use uuid::Uuid;

use super::domain::{validate_lines, validate_patch, total, NewOrder, Order, OrderLine, OrderPatch, OrderResource};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;
use crate::storage::{stream::lazy_batch, MemoryStore};

/// In-memory order repository for tests and local wiring
#[derive(Clone, Default)]
pub struct MemoryOrderRepository {
    orders: MemoryStore<Uuid, Order>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrudRepository<OrderResource> for MemoryOrderRepository {
    fn find_all(&self) -> BoxStream<'static, Result<Order, ServiceError>> {
        let orders = self.orders.clone();
        lazy_batch(async move { Ok(orders.list().await) })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Order, ServiceError> {
        self.orders.get(&id).await.ok_or_else(|| ServiceError::not_found("Order", id))
    }

    async fn save(&self, new: NewOrder) -> Result<Order, ServiceError> {
        validate_lines(&new.lines)?;
        let now = Utc::now();
        let lines = new.lines.iter().map(OrderLine::from_input).collect();
        let order = Order::new(Uuid::new_v4(), new.user_id, lines, now, now);
        self.orders
            .update_map(|m| {
                m.insert(order.id, order.clone());
                Ok(order)
            })
            .await
    }

    async fn update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, ServiceError> {
        validate_patch(&patch)?;
        self.orders
            .update_map(|m| {
                let order = m.get_mut(&id).ok_or_else(|| ServiceError::not_found("Order", id))?;
                if let Some(user_id) = patch.user_id {
                    order.user_id = user_id;
                }
                if let Some(lines) = &patch.lines {
                    order.lines = lines.iter().map(OrderLine::from_input).collect();
                    order.total = total(&order.lines);
                }
                order.updated_at = Utc::now();
                Ok(order.clone())
            })
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.orders.remove(&id).await {
            Ok(())
        } else {
            Err(ServiceError::not_found("Order", id))
        }
    }
}
