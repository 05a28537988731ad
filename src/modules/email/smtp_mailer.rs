//! SMTP delivery via the `lettre` async transport

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailError, Mailer, ReminderMessage};
use crate::core::config::SmtpConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the STARTTLS relay transport once; connections are pooled by lettre
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        tracing::info!(
            "SMTP mailer configured: host={}, port={}, from={}",
            config.host,
            config.port,
            config.from_address
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reminder(
        &self,
        to: &str,
        title: &str,
        start_time: DateTime<Utc>,
    ) -> Result<(), EmailError> {
        let reminder = ReminderMessage::build(title, start_time)?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(reminder.subject)
            .multipart(MultiPart::alternative_plain_html(
                reminder.text,
                reminder.html,
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        tracing::info!(to = to, title = title, "Reminder email sent");
        Ok(())
    }
}
