//! In-memory agenda store
//!
//! Keeps everything in ordered maps behind one async lock. Used when no
//! database is configured and by the test suites.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::AgendaStore;
use crate::core::error::Result;
use crate::features::appointments::models::{Appointment, AppointmentChanges, NewAppointment};
use crate::features::categories::models::{Category, NewCategory};
use crate::shared::constants::DEFAULT_CATEGORIES;

#[derive(Debug)]
struct MemoryState {
    categories: BTreeMap<i32, Category>,
    appointments: BTreeMap<i32, Appointment>,
    next_category_id: i32,
    next_appointment_id: i32,
}

pub struct MemoryAgendaStore {
    state: RwLock<MemoryState>,
}

impl MemoryAgendaStore {
    /// Empty store; ids start at 1
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                categories: BTreeMap::new(),
                appointments: BTreeMap::new(),
                next_category_id: 1,
                next_appointment_id: 1,
            }),
        }
    }

    /// Store pre-populated with the default categories (ids 1..=4)
    pub fn with_default_categories() -> Self {
        let mut categories = BTreeMap::new();
        let mut next_category_id = 1;
        for (name, color) in DEFAULT_CATEGORIES {
            categories.insert(
                next_category_id,
                Category {
                    id: next_category_id,
                    name: name.to_string(),
                    color: color.to_string(),
                },
            );
            next_category_id += 1;
        }

        Self {
            state: RwLock::new(MemoryState {
                categories,
                appointments: BTreeMap::new(),
                next_category_id,
                next_appointment_id: 1,
            }),
        }
    }
}

impl Default for MemoryAgendaStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_start(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by_key(|a| (a.start_time, a.id));
    appointments
}

#[async_trait]
impl AgendaStore for MemoryAgendaStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn create_category(&self, data: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        let id = state.next_category_id;
        state.next_category_id += 1;

        let category = Category {
            id,
            name: data.name,
            color: data.color,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> Result<()> {
        self.state.write().await.categories.remove(&id);
        Ok(())
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(sorted_by_start(
            state.appointments.values().cloned().collect(),
        ))
    }

    async fn list_appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(sorted_by_start(
            state
                .appointments
                .values()
                .filter(|a| a.start_time >= start && a.start_time <= end)
                .cloned()
                .collect(),
        ))
    }

    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment> {
        let mut state = self.state.write().await;
        let id = state.next_appointment_id;
        state.next_appointment_id += 1;

        let appointment = Appointment {
            id,
            title: data.title,
            description: data.description,
            start_time: data.start_time,
            end_time: data.end_time,
            category_id: data.category_id,
            email: data.email,
            notification_sent: false,
        };
        state.appointments.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: i32,
        changes: AppointmentChanges,
    ) -> Result<Option<Appointment>> {
        let mut state = self.state.write().await;
        let Some(existing) = state.appointments.get(&id).cloned() else {
            return Ok(None);
        };

        let updated = changes.apply_to(existing);
        state.appointments.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_appointment(&self, id: i32) -> Result<()> {
        self.state.write().await.appointments.remove(&id);
        Ok(())
    }

    async fn list_appointments_pending_notification(&self) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        Ok(sorted_by_start(
            state
                .appointments
                .values()
                .filter(|a| !a.notification_sent)
                .cloned()
                .collect(),
        ))
    }

    async fn mark_notification_sent(&self, id: i32) -> Result<()> {
        if let Some(appointment) = self.state.write().await.appointments.get_mut(&id) {
            appointment.notification_sent = true;
        }
        Ok(())
    }
}
