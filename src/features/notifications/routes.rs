use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::notifications::handlers;
use crate::modules::email::Mailer;

/// Create routes for the notifications feature
pub fn routes(mailer: Arc<dyn Mailer>) -> Router {
    Router::new()
        .route(
            "/api/test-notification",
            post(handlers::send_test_notification),
        )
        .with_state(mailer)
}
