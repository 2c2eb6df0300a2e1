use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use uuid::Uuid;

use super::domain::{Appointment, AppointmentRecords, NewAppointment};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;
use crate::storage::{stream::lazy_batch, MemoryStore};

/// In-memory appointment store; ids count up from 1 and are never reused.
#[derive(Clone, Default)]
pub struct MemoryAppointmentStore {
    appointments: MemoryStore<i32, Appointment>,
    last_id: Arc<AtomicI32>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrudRepository<AppointmentRecords> for MemoryAppointmentStore {
    fn find_all(&self) -> BoxStream<'static, Result<Appointment, ServiceError>> {
        let appointments = self.appointments.clone();
        lazy_batch(async move { Ok(appointments.list().await) })
    }

    async fn find_by_id(&self, id: i32) -> Result<Appointment, ServiceError> {
        self.appointments.get(&id).await.ok_or_else(|| ServiceError::not_found("Appointment", id))
    }

    async fn save(&self, new: NewAppointment) -> Result<Appointment, ServiceError> {
        let appointment = Appointment {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: Uuid::new_v4(),
            user_id: new.user_id,
            assistance: new.assistance,
            date: new.date,
            description: new.description,
        };
        self.appointments
            .update_map(|m| {
                m.insert(appointment.id, appointment.clone());
                Ok(appointment)
            })
            .await
    }

    async fn update(&self, id: i32, patch: NewAppointment) -> Result<Appointment, ServiceError> {
        self.appointments
            .update_map(|m| {
                let a = m.get_mut(&id).ok_or_else(|| ServiceError::not_found("Appointment", id))?;
                a.user_id = patch.user_id;
                a.assistance = patch.assistance;
                a.date = patch.date;
                a.description = patch.description;
                Ok(a.clone())
            })
            .await
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if self.appointments.remove(&id).await {
            Ok(())
        } else {
            Err(ServiceError::not_found("Appointment", id))
        }
    }
}
