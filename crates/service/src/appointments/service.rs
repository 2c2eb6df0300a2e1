use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{info, instrument};

use super::domain::{AppointmentRecords, NewAppointment};
use super::dto::{AppointmentCreateDto, AppointmentDto, AppointmentResource};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;

/// Maps appointment DTOs onto a typed store.
#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn CrudRepository<AppointmentRecords>>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn CrudRepository<AppointmentRecords>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CrudRepository<AppointmentResource> for AppointmentService {
    fn find_all(&self) -> BoxStream<'static, Result<AppointmentDto, ServiceError>> {
        self.store.find_all().map(|r| r.map(AppointmentDto::from)).boxed()
    }

    async fn find_by_id(&self, id: i32) -> Result<AppointmentDto, ServiceError> {
        self.store.find_by_id(id).await.map(Into::into)
    }

    #[instrument(skip(self, dto), fields(user = %dto.user))]
    async fn save(&self, dto: AppointmentCreateDto) -> Result<AppointmentDto, ServiceError> {
        let new = NewAppointment::try_from(dto)?;
        let saved = self.store.save(new).await?;
        info!(appointment_id = saved.id, uuid = %saved.uuid, "appointment_created");
        Ok(saved.into())
    }

    #[instrument(skip(self, dto))]
    async fn update(&self, id: i32, dto: AppointmentDto) -> Result<AppointmentDto, ServiceError> {
        let patch = NewAppointment::try_from(dto)?;
        self.store.update(id, patch).await.map(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        info!(appointment_id = id, "appointment_deleted");
        Ok(())
    }
}
