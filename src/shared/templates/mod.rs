//! Message template management.
//!
//! Templates are stored in `templates/` and use Jinja2 syntax.

pub mod engine;

pub use engine::{render_template, TemplateError};

use serde_json::json;

/// Rendered bodies of a reminder email
#[derive(Debug, Clone)]
pub struct ReminderBodies {
    pub html: String,
    pub text: String,
}

/// Render the appointment reminder email in both HTML and plain text.
///
/// `start_time` is expected to be already formatted for humans.
pub fn render_reminder_email(
    title: &str,
    start_time: &str,
    lead_minutes: i64,
) -> Result<ReminderBodies, TemplateError> {
    let ctx = json!({
        "title": title,
        "start_time": start_time,
        "lead_minutes": lead_minutes,
    });

    Ok(ReminderBodies {
        html: render_template("email/reminder.html.jinja", &ctx)?,
        text: render_template("email/reminder.txt.jinja", &ctx)?,
    })
}
