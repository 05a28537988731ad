use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::error::{AppError, Result};
use crate::features::appointments::dtos::{
    AppointmentResponseDto, CreateAppointmentDto, UpdateAppointmentDto,
};
use crate::features::appointments::models::Appointment;
use crate::features::appointments::services::ConflictChecker;
use crate::modules::storage::AgendaStore;
use crate::shared::constants::APPOINTMENT_CONFLICT_MESSAGE;

/// Service for appointment operations
pub struct AppointmentService {
    store: Arc<dyn AgendaStore>,
    conflict_checker: Arc<ConflictChecker>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AgendaStore>, conflict_checker: Arc<ConflictChecker>) -> Self {
        Self {
            store,
            conflict_checker,
        }
    }

    /// List appointments, optionally only those starting inside `[start, end]`
    pub async fn list(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AppointmentResponseDto>> {
        let appointments = match range {
            Some((start, end)) => self.store.list_appointments_in_range(start, end).await?,
            None => self.store.list_appointments().await?,
        };

        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Create an appointment unless it overlaps an existing one
    pub async fn create(&self, dto: CreateAppointmentDto) -> Result<AppointmentResponseDto> {
        ensure_valid_range(dto.start_time, dto.end_time)?;

        let conflicts = self
            .conflict_checker
            .check_conflicts(dto.interval(), None)
            .await?;
        reject_conflicts(conflicts)?;

        let appointment = self.store.create_appointment(dto.into()).await?;

        tracing::info!(
            "Appointment created: id={}, start={}, reminder={}",
            appointment.id,
            appointment.start_time,
            appointment.email.is_some()
        );

        Ok(appointment.into())
    }

    /// Apply a partial update.
    ///
    /// The conflict check only runs when the payload itself carries both
    /// times; the appointment being updated never conflicts with itself.
    pub async fn update(
        &self,
        id: i32,
        dto: UpdateAppointmentDto,
    ) -> Result<AppointmentResponseDto> {
        let existing = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        ensure_valid_range(
            dto.start_time.unwrap_or(existing.start_time),
            dto.end_time.unwrap_or(existing.end_time),
        )?;

        if dto.touches_timing() {
            let conflicts = self
                .conflict_checker
                .check_conflicts(dto.interval(), Some(id))
                .await?;
            reject_conflicts(conflicts)?;
        }

        let updated = self
            .store
            .update_appointment(id, dto.into())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        tracing::info!("Appointment updated: id={}", updated.id);

        Ok(updated.into())
    }

    /// Delete an appointment. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: i32) -> Result<()> {
        self.store.delete_appointment(id).await?;
        tracing::info!("Appointment deleted: id={}", id);
        Ok(())
    }
}

fn ensure_valid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(AppError::Validation(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}

fn reject_conflicts(conflicts: Vec<Appointment>) -> Result<()> {
    if conflicts.is_empty() {
        return Ok(());
    }

    let conflicts: Vec<AppointmentResponseDto> =
        conflicts.into_iter().map(|a| a.into()).collect();
    let details = serde_json::to_value(&conflicts)
        .map_err(|e| AppError::Internal(format!("Failed to serialize conflicts: {}", e)))?;

    Err(AppError::Conflict {
        message: APPOINTMENT_CONFLICT_MESSAGE.to_string(),
        details: Some(details),
    })
}
