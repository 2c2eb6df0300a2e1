//! Create `order_line` table with FK to `orders` (cascade on delete).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderLine::Table)
                    .if_not_exists()
                    .col(uuid(OrderLine::Id).primary_key())
                    .col(uuid(OrderLine::OrderId).not_null())
                    .col(uuid(OrderLine::ProductId).not_null())
                    .col(integer(OrderLine::Quantity).not_null())
                    .col(double(OrderLine::UnitPrice).not_null())
                    .col(integer(OrderLine::Position).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_line_order")
                            .from(OrderLine::Table, OrderLine::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_line_order_id")
                    .table(OrderLine::Table)
                    .col(OrderLine::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrderLine::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrderLine { Table, Id, OrderId, ProductId, Quantity, UnitPrice, Position }

#[derive(DeriveIden)]
enum Orders { Table, Id }
