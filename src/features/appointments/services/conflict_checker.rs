use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::appointments::models::{Appointment, CandidateInterval};
use crate::modules::storage::AgendaStore;

/// Whether the half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant. Intervals that only touch do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Appointments from `existing` that collide with `candidate`, skipping `exclude_id`
pub fn find_conflicts(
    candidate: CandidateInterval,
    exclude_id: Option<i32>,
    existing: Vec<Appointment>,
) -> Vec<Appointment> {
    let Some((start, end)) = candidate.bounds() else {
        return Vec::new();
    };

    existing
        .into_iter()
        .filter(|a| Some(a.id) != exclude_id)
        .filter(|a| overlaps(start, end, a.start_time, a.end_time))
        .collect()
}

/// Detects scheduling conflicts against every stored appointment
pub struct ConflictChecker {
    store: Arc<dyn AgendaStore>,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn AgendaStore>) -> Self {
        Self { store }
    }

    /// Return the stored appointments overlapping `candidate`.
    ///
    /// A candidate missing either bound cannot be checked and yields no
    /// conflicts. `exclude_id` lets an appointment be moved without clashing
    /// with itself.
    pub async fn check_conflicts(
        &self,
        candidate: CandidateInterval,
        exclude_id: Option<i32>,
    ) -> Result<Vec<Appointment>> {
        if candidate.bounds().is_none() {
            return Ok(Vec::new());
        }

        let existing = self.store.list_appointments().await?;
        let conflicts = find_conflicts(candidate, exclude_id, existing);

        if !conflicts.is_empty() {
            tracing::debug!(
                "Candidate {:?} conflicts with appointments {:?}",
                candidate,
                conflicts.iter().map(|a| a.id).collect::<Vec<_>>()
            );
        }

        Ok(conflicts)
    }
}
