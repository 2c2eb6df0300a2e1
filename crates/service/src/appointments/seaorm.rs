use async_trait::async_trait;
use futures_util::stream::BoxStream;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::warn;
use uuid::Uuid;

use super::domain::{Appointment, AppointmentRecords, AssistanceType, NewAppointment};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;
use crate::storage::stream::lazy_batch;
use models::appointment;

pub struct SeaOrmAppointmentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmAppointmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(m: appointment::Model) -> Result<Appointment, ServiceError> {
    let assistance: AssistanceType = m.assistance.parse().map_err(|e: String| {
        warn!(appointment_id = m.id, error = %e, "stored appointment has unknown assistance type");
        ServiceError::Db(e)
    })?;
    Ok(Appointment {
        id: m.id,
        uuid: m.uuid,
        user_id: m.user_id,
        assistance,
        date: m.date,
        description: m.description,
    })
}

#[async_trait]
impl CrudRepository<AppointmentRecords> for SeaOrmAppointmentStore {
    fn find_all(&self) -> BoxStream<'static, Result<Appointment, ServiceError>> {
        let db = self.db.clone();
        lazy_batch(async move {
            let rows = appointment::Entity::find().order_by_asc(appointment::Column::Id).all(&db).await?;
            rows.into_iter().map(to_domain).collect()
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Appointment, ServiceError> {
        let m = appointment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Appointment", id))?;
        to_domain(m)
    }

    async fn save(&self, new: NewAppointment) -> Result<Appointment, ServiceError> {
        let am = appointment::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            assistance: Set(new.assistance.as_str().to_string()),
            date: Set(new.date),
            description: Set(new.description),
            ..Default::default()
        };
        to_domain(am.insert(&self.db).await?)
    }

    async fn update(&self, id: i32, patch: NewAppointment) -> Result<Appointment, ServiceError> {
        let existing = appointment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Appointment", id))?;
        let mut am: appointment::ActiveModel = existing.into();
        am.user_id = Set(patch.user_id);
        am.assistance = Set(patch.assistance.as_str().to_string());
        am.date = Set(patch.date);
        am.description = Set(patch.description);
        to_domain(am.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let res = appointment::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("Appointment", id));
        }
        Ok(())
    }
}
