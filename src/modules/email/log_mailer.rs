//! Development mailer that only logs reminders

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{EmailError, Mailer, ReminderMessage};

#[derive(Debug, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reminder(
        &self,
        to: &str,
        title: &str,
        start_time: DateTime<Utc>,
    ) -> Result<(), EmailError> {
        // Render anyway so template problems surface without SMTP
        let reminder = ReminderMessage::build(title, start_time)?;

        tracing::info!(
            to = to,
            subject = %reminder.subject,
            "SMTP not configured, reminder logged instead of sent"
        );
        tracing::debug!("Reminder body:\n{}", reminder.text);

        Ok(())
    }
}
