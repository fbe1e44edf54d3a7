use super::{fetch_page, search_term, Page, PageRequest};
use crate::{entities::transport_company, errors::ServiceError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransportCompanyInput {
    #[validate(length(min = 1, max = 200, message = "Company name must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
}

#[derive(Clone)]
pub struct TransportCompanyService {
    db: Arc<DatabaseConnection>,
}

impl TransportCompanyService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<transport_company::Model>, ServiceError> {
        let mut query = transport_company::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(transport_company::Column::Name.contains(term));
        }
        let query = query
            .order_by_asc(transport_company::Column::Name)
            .order_by_asc(transport_company::Column::Id);
        Ok(fetch_page(query, &*self.db, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<transport_company::Model, ServiceError> {
        transport_company::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transport company {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: TransportCompanyInput,
    ) -> Result<transport_company::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let created = transport_company::ActiveModel {
            name: Set(name),
            contact_info: Set(input.contact_info),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(transport_company_id = created.id, "Created transport company");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: TransportCompanyInput,
    ) -> Result<transport_company::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        let existing = self.get(id).await?;
        self.ensure_unique_name(&name, Some(id)).await?;

        let mut active: transport_company::ActiveModel = existing.into();
        active.name = Set(name);
        active.contact_info = Set(input.contact_info);
        Ok(active.update(&*self.db).await?)
    }

    /// Product links are removed with the company.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        existing.delete(&*self.db).await?;
        info!(transport_company_id = id, "Deleted transport company");
        Ok(())
    }

    async fn ensure_unique_name(&self, name: &str, exclude: Option<i32>) -> Result<(), ServiceError> {
        let mut query =
            transport_company::Entity::find().filter(transport_company::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(transport_company::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::IntegrityError(format!(
                "Transport company '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
