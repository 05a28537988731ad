//! Template engine for outgoing messages using Jinja2 syntax.
//!
//! Templates live in `templates/` at the project root and are embedded into the
//! binary at compile time, so rendering never touches the filesystem.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// (name, source) of every embedded template
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        "email/reminder.html.jinja",
        include_str!("../../../templates/email/reminder.html.jinja"),
    ),
    (
        "email/reminder.txt.jinja",
        include_str!("../../../templates/email/reminder.txt.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    // Appointment titles are user input; escape them in HTML output
    env.set_auto_escape_callback(|name| {
        if name.contains(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    for (name, source) in EMBEDDED_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with any serializable context.
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use crate::shared::templates::render_template;
///
/// let html = render_template(
///     "email/reminder.html.jinja",
///     json!({ "title": "Dentist", "start_time": "Monday, ...", "lead_minutes": 30 }),
/// )?;
/// ```
pub fn render_template<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template_exists(template_name: &str) -> bool {
        get_environment().get_template(template_name).is_ok()
    }

    #[test]
    fn test_render_missing_template() {
        let result = render_template("nonexistent.jinja", json!({}));
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_template_exists() {
        assert!(template_exists("email/reminder.html.jinja"));
        assert!(template_exists("email/reminder.txt.jinja"));
        assert!(!template_exists("definitely_not_a_real_template.jinja"));
    }

    #[test]
    fn test_html_template_escapes_title() {
        let html = render_template(
            "email/reminder.html.jinja",
            json!({ "title": "<b>Standup</b>", "start_time": "now", "lead_minutes": 30 }),
        )
        .unwrap();

        assert!(html.contains("&lt;b&gt;Standup"));
        assert!(!html.contains("<b>Standup</b>"));
    }

    #[test]
    fn test_text_template_is_not_escaped() {
        let text = render_template(
            "email/reminder.txt.jinja",
            json!({ "title": "Q&A", "start_time": "now", "lead_minutes": 30 }),
        )
        .unwrap();

        assert!(text.contains("Q&A"));
        assert!(text.contains("starting in 30 minutes"));
    }
}
