use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::notifications::dtos::{TestNotificationDto, TestNotificationResponseDto};
use crate::modules::email::Mailer;
use crate::shared::types::ApiResponse;

/// Send a test reminder
///
/// Delivers the same email the scheduler would send, right away. Useful to
/// verify SMTP settings.
#[utoipa::path(
    post,
    path = "/api/test-notification",
    request_body = TestNotificationDto,
    responses(
        (status = 200, description = "Reminder sent", body = ApiResponse<TestNotificationResponseDto>),
        (status = 400, description = "Invalid request"),
        (status = 502, description = "Email delivery failed")
    ),
    tag = "notifications"
)]
pub async fn send_test_notification(
    State(mailer): State<Arc<dyn Mailer>>,
    AppJson(dto): AppJson<TestNotificationDto>,
) -> Result<Json<ApiResponse<TestNotificationResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    mailer
        .send_reminder(&dto.email, dto.title.trim(), dto.start_time)
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("Failed to send email: {}", e)))?;

    tracing::info!("Test notification sent to {}", dto.email);

    Ok(Json(ApiResponse::success(
        Some(TestNotificationResponseDto { sent: true }),
        Some("Test notification sent successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    use crate::features::notifications::routes;
    use crate::modules::email::{EmailError, LogMailer};

    struct DownMailer;

    #[async_trait]
    impl Mailer for DownMailer {
        async fn send_reminder(
            &self,
            _to: &str,
            _title: &str,
            _start_time: DateTime<Utc>,
        ) -> std::result::Result<(), EmailError> {
            Err(EmailError::Build("connection refused".to_string()))
        }
    }

    fn body() -> serde_json::Value {
        json!({
            "email": "someone@example.com",
            "title": "Dentist",
            "startTime": "2025-01-06T14:25:00Z"
        })
    }

    #[tokio::test]
    async fn test_send_test_notification() {
        let server = TestServer::new(routes::routes(Arc::new(LogMailer::new()))).unwrap();

        let response = server.post("/api/test-notification").json(&body()).await;

        response.assert_status_ok();
        let body = response.json::<ApiResponse<TestNotificationResponseDto>>();
        assert!(body.success);
        assert!(body.data.unwrap().sent);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_bad_gateway() {
        let server = TestServer::new(routes::routes(Arc::new(DownMailer))).unwrap();

        server
            .post("/api/test-notification")
            .json(&body())
            .await
            .assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let server = TestServer::new(routes::routes(Arc::new(LogMailer::new()))).unwrap();

        server
            .post("/api/test-notification")
            .json(&json!({
                "email": "not-an-address",
                "title": "Dentist",
                "startTime": "2025-01-06T14:25:00Z"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
