use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::error::Result;
use crate::features::appointments::models::Appointment;
use crate::modules::email::Mailer;
use crate::modules::storage::AgendaStore;
use crate::shared::constants::REMINDER_LOOKAHEAD_MINUTES;

/// Delay between scheduler ticks
const TICK_INTERVAL_SECS: u64 = 60;

/// Outcome of a single tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Appointments not yet notified
    pub pending: usize,
    /// Pending appointments inside the reminder window
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Background worker that emails a reminder shortly before each appointment.
///
/// Every tick looks at appointments whose reminder has not gone out yet and
/// sends one for those starting within the next [`REMINDER_LOOKAHEAD_MINUTES`].
/// An appointment is only marked as notified after its email was accepted, so
/// a failed send is retried on the next tick.
pub struct NotificationScheduler {
    store: Arc<dyn AgendaStore>,
    mailer: Arc<dyn Mailer>,
}

impl NotificationScheduler {
    pub fn new(store: Arc<dyn AgendaStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Run the scheduler until `cancel` fires.
    ///
    /// Cancellation is only observed between ticks; a tick in progress always
    /// completes.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            "Starting notification scheduler (every {}s, {} min lookahead)",
            TICK_INTERVAL_SECS,
            REMINDER_LOOKAHEAD_MINUTES
        );

        let mut ticker = interval(Duration::from_secs(TICK_INTERVAL_SECS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let tick = AssertUnwindSafe(self.process_batch_at(Utc::now())).catch_unwind();
            match tick.await {
                Ok(Ok(summary)) if summary.due > 0 => {
                    tracing::info!(
                        "Notification tick: {} due, {} sent, {} failed",
                        summary.due,
                        summary.sent,
                        summary.failed
                    );
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::error!("Error processing notification batch: {:?}", e);
                }
                Err(_) => {
                    tracing::error!("Notification tick panicked, continuing on schedule");
                }
            }
        }
    }

    /// Send reminders for every pending appointment due relative to `now`.
    ///
    /// Only a failure to read the pending queue aborts the batch. Send and
    /// mark failures are logged per appointment and the batch moves on.
    pub async fn process_batch_at(&self, now: DateTime<Utc>) -> Result<TickSummary> {
        let pending = self.store.list_appointments_pending_notification().await?;

        let mut summary = TickSummary {
            pending: pending.len(),
            ..TickSummary::default()
        };

        for appointment in pending.iter().filter(|a| is_due(a, now)) {
            summary.due += 1;

            // is_due guarantees an address
            let Some(email) = appointment.email.as_deref() else {
                continue;
            };

            if let Err(e) = self
                .mailer
                .send_reminder(email, &appointment.title, appointment.start_time)
                .await
            {
                tracing::error!(
                    "Failed to send reminder for appointment {}: {}",
                    appointment.id,
                    e
                );
                summary.failed += 1;
                continue;
            }

            if let Err(e) = self.store.mark_notification_sent(appointment.id).await {
                tracing::error!(
                    "Reminder sent but appointment {} could not be marked notified: {:?}",
                    appointment.id,
                    e
                );
                summary.failed += 1;
                continue;
            }

            tracing::info!(
                "Reminder sent for appointment {} to {}",
                appointment.id,
                email
            );
            summary.sent += 1;
        }

        Ok(summary)
    }
}

/// Whether a pending appointment should get its reminder at `now`.
///
/// Due means it has an address and starts in `(now, now + lookahead]`.
pub fn is_due(appointment: &Appointment, now: DateTime<Utc>) -> bool {
    if appointment.notification_sent || appointment.email.is_none() {
        return false;
    }

    let window_end = now + chrono::Duration::minutes(REMINDER_LOOKAHEAD_MINUTES);
    appointment.start_time > now && appointment.start_time <= window_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::core::error::AppError;
    use crate::features::appointments::models::{AppointmentChanges, NewAppointment};
    use crate::features::categories::models::{Category, NewCategory};
    use crate::modules::email::EmailError;
    use crate::modules::storage::MemoryAgendaStore;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: AtomicBool,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_reminder(
            &self,
            to: &str,
            title: &str,
            _start_time: DateTime<Utc>,
        ) -> std::result::Result<(), EmailError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmailError::Build("relay unavailable".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), title.to_string()));
            Ok(())
        }
    }

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, second).unwrap()
    }

    fn setup() -> (Arc<MemoryAgendaStore>, Arc<RecordingMailer>, NotificationScheduler) {
        let store = Arc::new(MemoryAgendaStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let scheduler = NotificationScheduler::new(store.clone(), mailer.clone());
        (store, mailer, scheduler)
    }

    async fn add(
        store: &MemoryAgendaStore,
        title: &str,
        start: DateTime<Utc>,
        email: Option<&str>,
    ) -> Appointment {
        store
            .create_appointment(NewAppointment {
                title: title.to_string(),
                description: None,
                start_time: start,
                end_time: start + chrono::Duration::hours(1),
                category_id: None,
                email: email.map(str::to_string),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sends_and_marks_due_appointment() {
        let (store, mailer, scheduler) = setup();
        let appointment = add(&store, "Dentist", at(14, 25, 0), Some("a@example.com")).await;

        let summary = scheduler.process_batch_at(at(14, 0, 0)).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(
            mailer.sent(),
            vec![("a@example.com".to_string(), "Dentist".to_string())]
        );
        let stored = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert!(stored.notification_sent);

        // Never selected again
        let summary = scheduler.process_batch_at(at(14, 1, 0)).await.unwrap();
        assert_eq!(summary.pending, 0);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_is_retried_next_tick() {
        let (store, mailer, scheduler) = setup();
        let appointment = add(&store, "Standup", at(14, 25, 0), Some("a@example.com")).await;

        mailer.fail.store(true, Ordering::SeqCst);
        let summary = scheduler.process_batch_at(at(14, 0, 0)).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.sent, 0);
        let stored = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert!(!stored.notification_sent);

        mailer.fail.store(false, Ordering::SeqCst);
        let summary = scheduler.process_batch_at(at(14, 1, 0)).await.unwrap();
        assert_eq!(summary.sent, 1);
        let stored = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert!(stored.notification_sent);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        struct FailFirst {
            inner: RecordingMailer,
        }

        #[async_trait]
        impl Mailer for FailFirst {
            async fn send_reminder(
                &self,
                to: &str,
                title: &str,
                start_time: DateTime<Utc>,
            ) -> std::result::Result<(), EmailError> {
                if to == "broken@example.com" {
                    return Err(EmailError::Build("rejected recipient".to_string()));
                }
                self.inner.send_reminder(to, title, start_time).await
            }
        }

        let store = Arc::new(MemoryAgendaStore::new());
        let mailer = Arc::new(FailFirst {
            inner: RecordingMailer::default(),
        });
        let scheduler = NotificationScheduler::new(store.clone(), mailer.clone());

        add(&store, "First", at(14, 10, 0), Some("broken@example.com")).await;
        add(&store, "Second", at(14, 20, 0), Some("b@example.com")).await;

        let summary = scheduler.process_batch_at(at(14, 0, 0)).await.unwrap();

        assert_eq!(summary.due, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(mailer.inner.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_appointments_without_email() {
        let (store, mailer, scheduler) = setup();
        add(&store, "Private", at(14, 10, 0), None).await;

        let summary = scheduler.process_batch_at(at(14, 0, 0)).await.unwrap();

        assert_eq!(summary.pending, 1);
        assert_eq!(summary.due, 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let (store, mailer, scheduler) = setup();
        let now = at(14, 0, 0);
        add(&store, "Starting now", now, Some("a@example.com")).await;
        add(&store, "Already started", at(13, 50, 0), Some("a@example.com")).await;
        add(&store, "Edge of window", at(14, 30, 0), Some("a@example.com")).await;
        add(&store, "Just outside", at(14, 30, 1), Some("a@example.com")).await;

        let summary = scheduler.process_batch_at(now).await.unwrap();

        assert_eq!(summary.due, 1);
        let titles: Vec<String> = mailer.sent().into_iter().map(|(_, t)| t).collect();
        assert_eq!(titles, vec!["Edge of window".to_string()]);
    }

    #[test]
    fn test_is_due_ignores_already_notified() {
        let appointment = Appointment {
            id: 1,
            title: "Done".to_string(),
            description: None,
            start_time: at(14, 10, 0),
            end_time: at(15, 0, 0),
            category_id: None,
            email: Some("a@example.com".to_string()),
            notification_sent: true,
        };
        assert!(!is_due(&appointment, at(14, 0, 0)));
    }

    /// How the first read of the pending queue misbehaves
    #[derive(Clone, Copy)]
    enum FirstRead {
        Fails,
        Panics,
    }

    /// Memory store whose first pending-queue read goes wrong
    struct FlakyStore {
        inner: MemoryAgendaStore,
        first_read: FirstRead,
        reads: AtomicUsize,
    }

    impl FlakyStore {
        fn new(first_read: FirstRead) -> Self {
            Self {
                inner: MemoryAgendaStore::new(),
                first_read,
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AgendaStore for FlakyStore {
        async fn list_categories(&self) -> Result<Vec<Category>> {
            self.inner.list_categories().await
        }

        async fn create_category(&self, data: NewCategory) -> Result<Category> {
            self.inner.create_category(data).await
        }

        async fn delete_category(&self, id: i32) -> Result<()> {
            self.inner.delete_category(id).await
        }

        async fn list_appointments(&self) -> Result<Vec<Appointment>> {
            self.inner.list_appointments().await
        }

        async fn list_appointments_in_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Appointment>> {
            self.inner.list_appointments_in_range(start, end).await
        }

        async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
            self.inner.get_appointment(id).await
        }

        async fn create_appointment(&self, data: NewAppointment) -> Result<Appointment> {
            self.inner.create_appointment(data).await
        }

        async fn update_appointment(
            &self,
            id: i32,
            changes: AppointmentChanges,
        ) -> Result<Option<Appointment>> {
            self.inner.update_appointment(id, changes).await
        }

        async fn delete_appointment(&self, id: i32) -> Result<()> {
            self.inner.delete_appointment(id).await
        }

        async fn list_appointments_pending_notification(&self) -> Result<Vec<Appointment>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                match self.first_read {
                    FirstRead::Fails => {
                        return Err(AppError::Internal("connection reset".to_string()))
                    }
                    FirstRead::Panics => panic!("pending queue exploded"),
                }
            }
            self.inner.list_appointments_pending_notification().await
        }

        async fn mark_notification_sent(&self, id: i32) -> Result<()> {
            self.inner.mark_notification_sent(id).await
        }
    }

    async fn run_two_ticks_after(first_read: FirstRead) -> (Arc<FlakyStore>, Arc<RecordingMailer>) {
        let store = Arc::new(FlakyStore::new(first_read));
        let mailer = Arc::new(RecordingMailer::default());

        // The worker reads the wall clock, so place the appointment relative to it
        let start = Utc::now() + chrono::Duration::minutes(10);
        add(&store.inner, "Dentist", start, Some("a@example.com")).await;

        let scheduler = NotificationScheduler::new(store.clone(), mailer.clone());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { scheduler.run(cancel).await }
        });

        // First tick fires immediately, the second one period later
        tokio::time::sleep(Duration::from_secs(TICK_INTERVAL_SECS + 1)).await;
        cancel.cancel();
        handle.await.unwrap();

        (store, mailer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_queue_read_does_not_stop_later_ticks() {
        let (store, mailer) = run_two_ticks_after(FirstRead::Fails).await;

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(
            mailer.sent(),
            vec![("a@example.com".to_string(), "Dentist".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_tick_does_not_stop_later_ticks() {
        let (store, mailer) = run_two_ticks_after(FirstRead::Panics).await;

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(mailer.sent().len(), 1);
        let pending = store
            .inner
            .list_appointments_pending_notification()
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let (_store, _mailer, scheduler) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), scheduler.run(cancel))
            .await
            .expect("scheduler should exit once cancelled");
    }
}
