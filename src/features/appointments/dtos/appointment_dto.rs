use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::features::appointments::models::{
    Appointment, AppointmentChanges, CandidateInterval, NewAppointment,
};

/// Request DTO for creating an appointment.
///
/// A `notificationSent` field in the body is ignored; new appointments always
/// start unnotified.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentDto {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// RFC 3339 timestamp
    pub start_time: DateTime<Utc>,

    /// RFC 3339 timestamp, must be after `startTime`
    pub end_time: DateTime<Utc>,

    pub category_id: Option<i32>,

    /// Address that receives the reminder 30 minutes before the start
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreateAppointmentDto {
    /// Trim text fields and treat blank optional fields as absent
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = blank_to_none(self.description);
        self.email = blank_to_none(self.email);
        self
    }

    pub fn interval(&self) -> CandidateInterval {
        CandidateInterval::new(self.start_time, self.end_time)
    }
}

impl From<CreateAppointmentDto> for NewAppointment {
    fn from(dto: CreateAppointmentDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            start_time: dto.start_time,
            end_time: dto.end_time,
            category_id: dto.category_id,
            email: dto.email,
        }
    }
}

/// Request DTO for a partial appointment update.
///
/// Omitted fields keep their value. `description`, `categoryId` and `email`
/// are cleared by sending `null` (or an empty string for the text fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_email"))]
pub struct UpdateAppointmentDto {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,

    /// `null` turns the reminder off
    #[serde(default, deserialize_with = "nullable_field")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
}

impl UpdateAppointmentDto {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(blank_to_none);
        self.email = self.email.map(blank_to_none);
        self
    }

    /// Whether the update moves the appointment in time
    pub fn touches_timing(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    /// Interval formed by the payload's own times only
    pub fn interval(&self) -> CandidateInterval {
        CandidateInterval {
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

fn validate_update_email(dto: &UpdateAppointmentDto) -> Result<(), ValidationError> {
    match &dto.email {
        Some(Some(email)) if !email.validate_email() => {
            let mut err = ValidationError::new("email");
            err.message = Some("Invalid email format".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Tells an explicit `null` (`Some(None)`) apart from an absent field (`None`)
fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateAppointmentDto> for AppointmentChanges {
    fn from(dto: UpdateAppointmentDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            start_time: dto.start_time,
            end_time: dto.end_time,
            category_id: dto.category_id,
            email: dto.email,
        }
    }
}

/// Query params for listing appointments
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct ListAppointmentsQuery {
    /// Lower bound (inclusive) on start time; used only together with `endDate`
    pub start_date: Option<DateTime<Utc>>,

    /// Upper bound (inclusive) on start time; used only together with `startDate`
    pub end_date: Option<DateTime<Utc>>,
}

impl ListAppointmentsQuery {
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.start_date.zip(self.end_date)
    }
}

/// Response DTO for appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponseDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub email: Option<String>,
    pub notification_sent: bool,
}

impl From<Appointment> for AppointmentResponseDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            title: a.title,
            description: a.description,
            start_time: a.start_time,
            end_time: a.end_time,
            category_id: a.category_id,
            email: a.email,
            notification_sent: a.notification_sent,
        }
    }
}

/// Response DTO for appointment deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAppointmentResponseDto {
    pub deleted: bool,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_dto_ignores_notification_flag_and_blank_email() {
        let dto: CreateAppointmentDto = serde_json::from_value(json!({
            "title": "  Dentist ",
            "startTime": "2025-01-06T14:25:00Z",
            "endTime": "2025-01-06T15:00:00Z",
            "email": "",
            "notificationSent": true
        }))
        .unwrap();

        let dto = dto.normalized();
        assert_eq!(dto.title, "Dentist");
        assert_eq!(dto.email, None);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_dto_rejects_invalid_email() {
        let dto: CreateAppointmentDto = serde_json::from_value(json!({
            "title": "Dentist",
            "startTime": "2025-01-06T14:25:00Z",
            "endTime": "2025-01-06T15:00:00Z",
            "email": "not-an-email"
        }))
        .unwrap();

        assert!(dto.normalized().validate().is_err());
    }

    #[test]
    fn test_update_dto_interval_uses_payload_only() {
        let dto: UpdateAppointmentDto = serde_json::from_value(json!({
            "startTime": "2025-01-06T10:00:00Z"
        }))
        .unwrap();

        assert!(dto.touches_timing());
        assert_eq!(dto.interval().bounds(), None);
        assert!(!UpdateAppointmentDto::default().touches_timing());
    }

    #[test]
    fn test_update_dto_distinguishes_null_from_absent() {
        let dto: UpdateAppointmentDto = serde_json::from_value(json!({
            "email": null,
            "categoryId": null,
            "description": ""
        }))
        .unwrap();
        let dto = dto.normalized();

        assert_eq!(dto.email, Some(None));
        assert_eq!(dto.category_id, Some(None));
        assert_eq!(dto.description, Some(None));
        assert_eq!(dto.title, None);

        let untouched: UpdateAppointmentDto = serde_json::from_value(json!({})).unwrap();
        assert_eq!(untouched.email, None);
        assert_eq!(untouched.category_id, None);
    }

    #[test]
    fn test_update_dto_validates_new_email() {
        let bad: UpdateAppointmentDto =
            serde_json::from_value(json!({ "email": "nope" })).unwrap();
        assert!(bad.normalized().validate().is_err());

        let cleared: UpdateAppointmentDto =
            serde_json::from_value(json!({ "email": "" })).unwrap();
        assert!(cleared.normalized().validate().is_ok());

        let good: UpdateAppointmentDto =
            serde_json::from_value(json!({ "email": "a@example.com" })).unwrap();
        assert!(good.normalized().validate().is_ok());
    }
}
