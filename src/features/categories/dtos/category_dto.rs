use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::{Category, NewCategory};

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Any CSS color the calendar understands, e.g. "#1976D2"
    #[validate(length(min = 1, max = 50, message = "Color must be 1-50 characters"))]
    pub color: String,
}

impl CreateCategoryDto {
    /// Trim surrounding whitespace so blank values fail validation
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.color = self.color.trim().to_string();
        self
    }
}

impl From<CreateCategoryDto> for NewCategory {
    fn from(dto: CreateCategoryDto) -> Self {
        Self {
            name: dto.name,
            color: dto.color,
        }
    }
}

/// Response DTO for category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color: c.color,
        }
    }
}

/// Response DTO for category deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteCategoryResponseDto {
    pub deleted: bool,
}
