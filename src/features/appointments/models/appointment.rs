use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for appointment
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Appointment {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Soft reference; may point at a deleted category
    pub category_id: Option<i32>,
    /// Address that receives the reminder, if any
    pub email: Option<String>,
    pub notification_sent: bool,
}

/// Data for creating a new appointment.
///
/// There is no `notification_sent` field: new appointments always start unnotified.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub email: Option<String>,
}

/// Partial update of an appointment.
///
/// `None` leaves the stored value untouched. For nullable columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub category_id: Option<Option<i32>>,
    pub email: Option<Option<String>>,
}

impl AppointmentChanges {
    /// Apply the changes on top of an existing appointment
    pub fn apply_to(self, mut appointment: Appointment) -> Appointment {
        if let Some(title) = self.title {
            appointment.title = title;
        }
        if let Some(description) = self.description {
            appointment.description = description;
        }
        if let Some(start_time) = self.start_time {
            appointment.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            appointment.end_time = end_time;
        }
        if let Some(category_id) = self.category_id {
            appointment.category_id = category_id;
        }
        if let Some(email) = self.email {
            appointment.email = email;
        }
        appointment
    }
}

/// Candidate interval for a conflict check. Either bound may be missing on
/// partial updates, in which case no check is possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateInterval {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CandidateInterval {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Both bounds, if the candidate is complete
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.start_time.zip(self.end_time)
    }
}
