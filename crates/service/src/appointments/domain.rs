use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssistanceType {
    Installation,
    Maintenance,
    Repair,
    Consulting,
}

impl AssistanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistanceType::Installation => "INSTALLATION",
            AssistanceType::Maintenance => "MAINTENANCE",
            AssistanceType::Repair => "REPAIR",
            AssistanceType::Consulting => "CONSULTING",
        }
    }
}

impl fmt::Display for AssistanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSTALLATION" => Ok(AssistanceType::Installation),
            "MAINTENANCE" => Ok(AssistanceType::Maintenance),
            "REPAIR" => Ok(AssistanceType::Repair),
            "CONSULTING" => Ok(AssistanceType::Consulting),
            _ => Err(format!("unknown assistance type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i32,
    pub uuid: Uuid,
    pub user_id: Uuid,
    pub assistance: AssistanceType,
    pub date: NaiveDateTime,
    pub description: String,
}

/// Appointment fields a client controls; also the full replacement on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub assistance: AssistanceType,
    pub date: NaiveDateTime,
    pub description: String,
}

/// Store-level appointment records.
pub struct AppointmentRecords;

impl Resource for AppointmentRecords {
    const NAME: &'static str = "Appointment";
    type Id = i32;
    type Item = Appointment;
    type New = NewAppointment;
    type Patch = NewAppointment;
}
