//! Storage module for agenda persistence
//!
//! [`AgendaStore`] is the persistence collaborator shared by the API services
//! and the notification worker. Two implementations exist: Postgres via sqlx
//! for deployments and an in-memory store for development and tests. One of
//! them is chosen at startup from configuration and injected everywhere as
//! `Arc<dyn AgendaStore>`.

mod memory_store;
mod postgres_store;

pub use memory_store::MemoryAgendaStore;
pub use postgres_store::PgAgendaStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::appointments::models::{Appointment, AppointmentChanges, NewAppointment};
use crate::features::categories::models::{Category, NewCategory};

/// Read/write access to categories and appointments.
///
/// Implementations must make single-row writes atomic; callers take no locks.
#[async_trait]
pub trait AgendaStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn create_category(&self, data: NewCategory) -> Result<Category>;

    /// Deleting a missing category is not an error. Appointments keep their
    /// `category_id`.
    async fn delete_category(&self, id: i32) -> Result<()>;

    /// Every appointment, ordered by start time
    async fn list_appointments(&self) -> Result<Vec<Appointment>>;

    /// Appointments with `start <= start_time <= end`, ordered by start time
    async fn list_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>>;

    /// Stores a new appointment with `notification_sent = false`
    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment>;

    /// Returns `None` when no appointment has this id
    async fn update_appointment(
        &self,
        id: i32,
        changes: AppointmentChanges,
    ) -> Result<Option<Appointment>>;

    async fn delete_appointment(&self, id: i32) -> Result<()>;

    /// Appointments whose reminder has not been sent yet
    async fn list_appointments_pending_notification(&self) -> Result<Vec<Appointment>>;

    async fn mark_notification_sent(&self, id: i32) -> Result<()>;
}
