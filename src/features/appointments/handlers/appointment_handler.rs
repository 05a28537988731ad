use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::appointments::dtos::{
    AppointmentResponseDto, CreateAppointmentDto, DeleteAppointmentResponseDto,
    ListAppointmentsQuery, UpdateAppointmentDto,
};
use crate::features::appointments::services::AppointmentService;
use crate::shared::types::{ApiResponse, Meta};

/// List appointments
///
/// With both `startDate` and `endDate`, only appointments starting inside the
/// inclusive range are returned (the calendar asks for one week at a time).
#[utoipa::path(
    get,
    path = "/api/appointments",
    params(ListAppointmentsQuery),
    responses(
        (status = 200, description = "List of appointments", body = ApiResponse<Vec<AppointmentResponseDto>>),
    ),
    tag = "appointments"
)]
pub async fn list_appointments(
    State(service): State<Arc<AppointmentService>>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<ApiResponse<Vec<AppointmentResponseDto>>>> {
    let appointments = service.list(query.range()).await?;
    let total = appointments.len();
    Ok(Json(ApiResponse::success(
        Some(appointments),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create an appointment
///
/// Rejected with 409 when it overlaps an existing appointment; the response
/// `data` lists the appointments it collides with.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentDto,
    responses(
        (status = 201, description = "Appointment created", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Invalid appointment data"),
        (status = 409, description = "Appointment conflicts with existing events", body = ApiResponse<Vec<AppointmentResponseDto>>)
    ),
    tag = "appointments"
)]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentService>>,
    AppJson(dto): AppJson<CreateAppointmentDto>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let appointment = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(appointment), None, None)),
    ))
}

/// Update an appointment
///
/// Partial update. When the payload moves the appointment in time it is
/// checked for conflicts against every other appointment.
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    request_body = UpdateAppointmentDto,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentResponseDto>),
        (status = 400, description = "Invalid appointment data"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment conflicts with existing events", body = ApiResponse<Vec<AppointmentResponseDto>>)
    ),
    tag = "appointments"
)]
pub async fn update_appointment(
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateAppointmentDto>,
) -> Result<Json<ApiResponse<AppointmentResponseDto>>> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let appointment = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(appointment), None, None)))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment deleted", body = ApiResponse<DeleteAppointmentResponseDto>),
    ),
    tag = "appointments"
)]
pub async fn delete_appointment(
    State(service): State<Arc<AppointmentService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeleteAppointmentResponseDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteAppointmentResponseDto { deleted: true }),
        Some("Appointment deleted successfully".to_string()),
        None,
    )))
}
