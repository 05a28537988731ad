use utoipa::{Modify, OpenApi};

use crate::features::appointments::{
    dtos as appointments_dtos, handlers as appointments_handlers,
};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::delete_category,
        // Appointments
        appointments_handlers::list_appointments,
        appointments_handlers::create_appointment,
        appointments_handlers::update_appointment,
        appointments_handlers::delete_appointment,
        // Notifications
        notifications_handlers::send_test_notification,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::DeleteCategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::DeleteCategoryResponseDto>,
            // Appointments
            appointments_dtos::CreateAppointmentDto,
            appointments_dtos::UpdateAppointmentDto,
            appointments_dtos::AppointmentResponseDto,
            appointments_dtos::DeleteAppointmentResponseDto,
            ApiResponse<Vec<appointments_dtos::AppointmentResponseDto>>,
            ApiResponse<appointments_dtos::AppointmentResponseDto>,
            ApiResponse<appointments_dtos::DeleteAppointmentResponseDto>,
            // Notifications
            notifications_dtos::TestNotificationDto,
            notifications_dtos::TestNotificationResponseDto,
            ApiResponse<notifications_dtos::TestNotificationResponseDto>,
        )
    ),
    tags(
        (name = "categories", description = "Appointment categories"),
        (name = "appointments", description = "Weekly agenda appointments with conflict detection"),
        (name = "notifications", description = "Appointment reminder emails"),
    ),
    info(
        title = "Weekly Agenda API",
        version = "0.1.0",
        description = "API documentation for Weekly Agenda",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
