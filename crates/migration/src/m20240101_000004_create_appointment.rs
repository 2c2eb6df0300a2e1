//! Create `appointment` table. `id` is a database sequence, `uuid` is
//! assigned by the service.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(pk_auto(Appointment::Id))
                    .col(uuid(Appointment::Uuid).unique_key().not_null())
                    .col(uuid(Appointment::UserId).not_null())
                    .col(string_len(Appointment::Assistance, 32).not_null())
                    .col(date_time(Appointment::Date).not_null())
                    .col(text(Appointment::Description).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_appointment_user_id")
                    .table(Appointment::Table)
                    .col(Appointment::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, Id, Uuid, UserId, Assistance, Date, Description }
