//! Postgres-backed agenda store
//!
//! Uses runtime-checked sqlx queries so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::AgendaStore;
use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{Appointment, AppointmentChanges, NewAppointment};
use crate::features::categories::models::{Category, NewCategory};

const APPOINTMENT_COLUMNS: &str =
    "id, title, description, start_time, end_time, category_id, email, notification_sent";

pub struct PgAgendaStore {
    pool: PgPool,
}

impl PgAgendaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgendaStore for PgAgendaStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name, color FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn create_category(&self, data: NewCategory) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, color)
            VALUES ($1, $2)
            RETURNING id, name, color
            "#,
        )
        .bind(&data.name)
        .bind(&data.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM appointments ORDER BY start_time, id",
            APPOINTMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list appointments: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE start_time >= $1 AND start_time <= $2
            ORDER BY start_time, id
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list appointments by range: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM appointments WHERE id = $1",
            APPOINTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get appointment {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments
                (title, description, start_time, end_time, category_id, email, notification_sent)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.category_id)
        .bind(&data.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create appointment: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: i32,
        changes: AppointmentChanges,
    ) -> Result<Option<Appointment>> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                start_time = COALESCE($5, start_time),
                end_time = COALESCE($6, end_time),
                category_id = CASE WHEN $7 THEN $8 ELSE category_id END,
                email = CASE WHEN $9 THEN $10 ELSE email END
            WHERE id = $1
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.category_id.is_some())
        .bind(changes.category_id.flatten())
        .bind(changes.email.is_some())
        .bind(changes.email.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update appointment {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn delete_appointment(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete appointment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn list_appointments_pending_notification(&self) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE notification_sent = FALSE
            ORDER BY start_time, id
            "#,
            APPOINTMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch appointments pending notification: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn mark_notification_sent(&self, id: i32) -> Result<()> {
        sqlx::query("UPDATE appointments SET notification_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark appointment {} as notified: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
