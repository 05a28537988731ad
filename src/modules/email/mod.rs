//! Email module for appointment reminders
//!
//! [`Mailer`] is the email collaborator used by the notification worker.
//! [`SmtpMailer`] delivers through an SMTP relay with `lettre`; when no relay
//! is configured [`LogMailer`] only records the reminder in the logs.

mod log_mailer;
mod smtp_mailer;

pub use log_mailer::LogMailer;
pub use smtp_mailer::SmtpMailer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::shared::constants::REMINDER_LOOKAHEAD_MINUTES;
use crate::shared::templates::{render_reminder_email, TemplateError};

/// Error type for email delivery failures
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.)
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled
    #[error("Email build error: {0}")]
    Build(String),

    #[error("Email template error: {0}")]
    Template(#[from] TemplateError),
}

/// Sends appointment reminders
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reminder(
        &self,
        to: &str,
        title: &str,
        start_time: DateTime<Utc>,
    ) -> Result<(), EmailError>;
}

/// Fully rendered reminder, ready for any transport
#[derive(Debug, Clone)]
pub struct ReminderMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl ReminderMessage {
    pub fn build(title: &str, start_time: DateTime<Utc>) -> Result<Self, EmailError> {
        let bodies = render_reminder_email(
            title,
            &format_start_time(start_time),
            REMINDER_LOOKAHEAD_MINUTES,
        )?;

        Ok(Self {
            subject: format!(
                "Reminder: {} in {} minutes",
                title, REMINDER_LOOKAHEAD_MINUTES
            ),
            html: bodies.html,
            text: bodies.text,
        })
    }
}

/// Human-readable start time, e.g. "Monday, January 6, 2025 at 02:25 PM UTC"
pub fn format_start_time(start_time: DateTime<Utc>) -> String {
    start_time.format("%A, %B %-d, %Y at %I:%M %p UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_start_time() {
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 14, 25, 0).unwrap();
        assert_eq!(
            format_start_time(start),
            "Monday, January 6, 2025 at 02:25 PM UTC"
        );
    }

    #[test]
    fn test_reminder_message_subject_and_bodies() {
        let start = Utc.with_ymd_and_hms(2025, 1, 6, 14, 25, 0).unwrap();
        let message = ReminderMessage::build("Dentist", start).unwrap();

        assert_eq!(message.subject, "Reminder: Dentist in 30 minutes");
        assert!(message.html.contains("Dentist"));
        assert!(message.html.contains("Monday, January 6, 2025 at 02:25 PM UTC"));
        assert!(message.text.contains("Time: Monday, January 6, 2025 at 02:25 PM UTC"));
    }

    #[test]
    fn test_email_error_display() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");

        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
