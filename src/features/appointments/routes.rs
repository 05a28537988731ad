use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::appointments::handlers;
use crate::features::appointments::services::AppointmentService;

/// Create routes for the appointments feature
pub fn routes(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/api/appointments/{id}",
            put(handlers::update_appointment).delete(handlers::delete_appointment),
        )
        .with_state(service)
}
