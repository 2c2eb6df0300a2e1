use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::BoxStream;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{validate_lines, validate_patch, NewOrder, Order, OrderLine, OrderLineInput, OrderPatch, OrderResource};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;
use crate::storage::stream::lazy_batch;
use models::{order, order_line};

pub struct SeaOrmOrderRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(o: order::Model, lines: Vec<order_line::Model>) -> Order {
    let lines = lines
        .into_iter()
        .map(|l| OrderLine { id: l.id, product_id: l.product_id, quantity: l.quantity, unit_price: l.unit_price })
        .collect();
    Order::new(o.id, o.user_id, lines, o.created_at.with_timezone(&Utc), o.updated_at.with_timezone(&Utc))
}

async fn insert_lines<C: ConnectionTrait>(conn: &C, order_id: Uuid, lines: &[OrderLineInput]) -> Result<Vec<order_line::Model>, ServiceError> {
    let mut saved = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let am = order_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            position: Set(position as i32),
        };
        saved.push(am.insert(conn).await?);
    }
    Ok(saved)
}

#[async_trait]
impl CrudRepository<OrderResource> for SeaOrmOrderRepository {
    fn find_all(&self) -> BoxStream<'static, Result<Order, ServiceError>> {
        let db = self.db.clone();
        lazy_batch(async move {
            let rows = order::Entity::find()
                .find_with_related(order_line::Entity)
                .order_by_asc(order::Column::CreatedAt)
                .order_by_asc(order::Column::Id)
                .order_by_asc(order_line::Column::Position)
                .all(&db)
                .await?;
            Ok(rows.into_iter().map(|(o, lines)| to_domain(o, lines)).collect())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Order, ServiceError> {
        let o = order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;
        let lines = o.find_related(order_line::Entity).order_by_asc(order_line::Column::Position).all(&self.db).await?;
        Ok(to_domain(o, lines))
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id, lines = new.lines.len()))]
    async fn save(&self, new: NewOrder) -> Result<Order, ServiceError> {
        validate_lines(&new.lines)?;
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;
        let o = order::ActiveModel { id: Set(Uuid::new_v4()), user_id: Set(new.user_id), created_at: Set(now), updated_at: Set(now) }
            .insert(&txn)
            .await?;
        let lines = insert_lines(&txn, o.id, &new.lines).await?;
        txn.commit().await?;
        info!(order_id = %o.id, "order_created");
        Ok(to_domain(o, lines))
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, ServiceError> {
        validate_patch(&patch)?;
        let txn = self.db.begin().await?;
        let existing = order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;
        let mut am: order::ActiveModel = existing.into();
        if let Some(user_id) = patch.user_id {
            am.user_id = Set(user_id);
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        let o = am.update(&txn).await?;
        let lines = match &patch.lines {
            Some(lines) => {
                order_line::Entity::delete_many().filter(order_line::Column::OrderId.eq(id)).exec(&txn).await?;
                insert_lines(&txn, id, lines).await?
            }
            None => o.find_related(order_line::Entity).order_by_asc(order_line::Column::Position).all(&txn).await?,
        };
        txn.commit().await?;
        Ok(to_domain(o, lines))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        order_line::Entity::delete_many().filter(order_line::Column::OrderId.eq(id)).exec(&txn).await?;
        let res = order::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ServiceError::not_found("Order", id));
        }
        txn.commit().await?;
        info!(order_id = %id, "order_deleted");
        Ok(())
    }
}
