use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreateDto {
    pub user: Uuid,
    pub assistance: String,
    pub date: String,
    pub description: String,
}

/// Full appointment view. On update `id` and `uuid` may be omitted and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDto {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub uuid: Uuid,
    pub user: Uuid,
    pub assistance: String,
    pub date: String,
    pub description: String,
}

pub struct AppointmentResource;

impl Resource for AppointmentResource {
    const NAME: &'static str = "Appointment";
    type Id = i32;
    type Item = AppointmentDto;
    type New = AppointmentCreateDto;
    type Patch = AppointmentDto;
}
