use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::modules::storage::AgendaStore;

/// Service for category operations
pub struct CategoryService {
    store: Arc<dyn AgendaStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn AgendaStore>) -> Self {
        Self { store }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.list_categories().await?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Create a new category
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let category = self.store.create_category(dto.into()).await?;

        tracing::info!(
            "Category created: id={}, name={}",
            category.id,
            category.name
        );

        Ok(category.into())
    }

    /// Delete a category. Appointments referencing it keep the stale id.
    pub async fn delete(&self, id: i32) -> Result<()> {
        self.store.delete_category(id).await?;
        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }
}
