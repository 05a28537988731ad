use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, DeleteCategoryResponseDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list().await?;
    let total = categories.len();
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid category data")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category), None, None)),
    ))
}

/// Delete a category
///
/// Appointments that reference the category are left untouched.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeleteCategoryResponseDto>),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeleteCategoryResponseDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteCategoryResponseDto { deleted: true }),
        Some("Category deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::categories::routes;
    use crate::modules::storage::MemoryAgendaStore;

    fn server() -> TestServer {
        let store = Arc::new(MemoryAgendaStore::with_default_categories());
        let service = Arc::new(CategoryService::new(store));
        TestServer::new(routes::routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_list_default_categories() {
        let server = server();

        let response = server.get("/api/categories").await;
        response.assert_status_ok();

        let body: ApiResponse<Vec<CategoryResponseDto>> = response.json();
        let categories = body.data.unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0].name, "Work");
        assert_eq!(categories[0].color, "#1976D2");
        assert_eq!(body.meta.unwrap().total, 4);
    }

    #[tokio::test]
    async fn test_create_and_delete_category() {
        let server = server();

        let response = server
            .post("/api/categories")
            .json(&json!({ "name": "Travel", "color": "#795548" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created = response
            .json::<ApiResponse<CategoryResponseDto>>()
            .data
            .unwrap();
        assert_eq!(created.id, 5);

        server
            .delete(&format!("/api/categories/{}", created.id))
            .await
            .assert_status_ok();

        let remaining = server
            .get("/api/categories")
            .await
            .json::<ApiResponse<Vec<CategoryResponseDto>>>()
            .data
            .unwrap();
        assert!(remaining.iter().all(|c| c.id != created.id));
    }

    #[tokio::test]
    async fn test_create_category_rejects_empty_name() {
        let server = server();

        let response = server
            .post("/api/categories")
            .json(&json!({ "name": "", "color": "#000" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_category_rejects_blank_values() {
        let server = server();

        server
            .post("/api/categories")
            .json(&json!({ "name": "   ", "color": "  " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/categories")
            .json(&json!({ "name": "Errands", "color": " \t" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let categories = server
            .get("/api/categories")
            .await
            .json::<ApiResponse<Vec<CategoryResponseDto>>>()
            .data
            .unwrap();
        assert_eq!(categories.len(), 4);
    }

    #[tokio::test]
    async fn test_create_category_trims_values() {
        let server = server();

        let created = server
            .post("/api/categories")
            .json(&json!({ "name": "  Travel ", "color": " #795548 " }))
            .await
            .json::<ApiResponse<CategoryResponseDto>>()
            .data
            .unwrap();
        assert_eq!(created.name, "Travel");
        assert_eq!(created.color, "#795548");
    }
}
