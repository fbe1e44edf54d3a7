use super::{fetch_page, search_term, Page, PageRequest};
use crate::{
    entities::{category, product},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Create or replace a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Categories ordered by name, optionally filtered by a name fragment
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<category::Model>, ServiceError> {
        let mut query = category::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(category::Column::Name.contains(term));
        }
        let query = query
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id);
        Ok(fetch_page(query, &*self.db, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CategoryInput) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let created = category::ActiveModel {
            name: Set(name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = created.id, "Created category");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: CategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        let existing = self.get(id).await?;
        self.ensure_unique_name(&name, Some(id)).await?;

        let mut active: category::ActiveModel = existing.into();
        active.name = Set(name);
        active.description = Set(input.description);
        let updated = active.update(&*self.db).await?;

        info!(category_id = id, "Updated category");
        Ok(updated)
    }

    /// Refused while any product still belongs to the category.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let referencing = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .count(&*self.db)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Category {} is referenced by {} products",
                id, referencing
            )));
        }

        existing.delete(&*self.db).await?;
        info!(category_id = id, "Deleted category");
        Ok(())
    }

    async fn ensure_unique_name(&self, name: &str, exclude: Option<i32>) -> Result<(), ServiceError> {
        let mut query = category::Entity::find().filter(category::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Category '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
