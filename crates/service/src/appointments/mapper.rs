use chrono::NaiveDateTime;

use super::domain::{Appointment, AssistanceType, NewAppointment};
use super::dto::{AppointmentCreateDto, AppointmentDto};
use crate::errors::ServiceError;

// `%.f` prints nothing for whole seconds and 3, 6 or 9 digits otherwise
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an ISO-8601 local date-time; seconds and fractions are optional.
pub fn parse_date(s: &str) -> Result<NaiveDateTime, ServiceError> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| ServiceError::BadRequest(format!("invalid date: {}", s)))
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_assistance(s: &str) -> Result<AssistanceType, ServiceError> {
    s.parse().map_err(ServiceError::BadRequest)
}

impl TryFrom<AppointmentCreateDto> for NewAppointment {
    type Error = ServiceError;

    fn try_from(dto: AppointmentCreateDto) -> Result<Self, Self::Error> {
        Ok(NewAppointment {
            user_id: dto.user,
            assistance: parse_assistance(&dto.assistance)?,
            date: parse_date(&dto.date)?,
            description: dto.description,
        })
    }
}

/// Update body to replacement fields; `id` and `uuid` are dropped.
impl TryFrom<AppointmentDto> for NewAppointment {
    type Error = ServiceError;

    fn try_from(dto: AppointmentDto) -> Result<Self, Self::Error> {
        Ok(NewAppointment {
            user_id: dto.user,
            assistance: parse_assistance(&dto.assistance)?,
            date: parse_date(&dto.date)?,
            description: dto.description,
        })
    }
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        AppointmentDto {
            id: a.id,
            uuid: a.uuid,
            user: a.user_id,
            assistance: a.assistance.to_string(),
            date: format_date(&a.date),
            description: a.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn dates_with_and_without_seconds() {
        let a = parse_date("2024-05-01T10:30:00").unwrap();
        let b = parse_date("2024-05-01T10:30").unwrap();
        assert_eq!(a, b);
        assert_eq!(format_date(&a), "2024-05-01T10:30:00");
        assert!(matches!(parse_date("01/05/2024"), Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn fractional_seconds_survive_format_and_reparse() {
        let stored = parse_date("2024-05-01T10:30:00.750").unwrap();
        let rendered = format_date(&stored);
        assert_eq!(rendered, "2024-05-01T10:30:00.750");
        assert_eq!(parse_date(&rendered).unwrap(), stored);
    }

    #[test]
    fn create_dto_maps_to_model() {
        let dto = AppointmentCreateDto {
            user: Uuid::new_v4(),
            assistance: "maintenance".into(),
            date: "2024-06-10T09:00:00".into(),
            description: "yearly check".into(),
        };
        let new = NewAppointment::try_from(dto).unwrap();
        assert_eq!(new.assistance, AssistanceType::Maintenance);
    }

    #[test]
    fn unknown_assistance_is_bad_request() {
        let dto = AppointmentCreateDto {
            user: Uuid::new_v4(),
            assistance: "gardening".into(),
            date: "2024-06-10T09:00:00".into(),
            description: String::new(),
        };
        assert!(matches!(NewAppointment::try_from(dto), Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn model_maps_to_dto() {
        let a = Appointment {
            id: 3,
            uuid: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            assistance: AssistanceType::Repair,
            date: parse_date("2024-06-10T09:00:00").unwrap(),
            description: "leak".into(),
        };
        let dto = AppointmentDto::from(a.clone());
        assert_eq!(dto.id, 3);
        assert_eq!(dto.uuid, a.uuid);
        assert_eq!(dto.assistance, "REPAIR");
        assert_eq!(dto.date, "2024-06-10T09:00:00");
    }
}
