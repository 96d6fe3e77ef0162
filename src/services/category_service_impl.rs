use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{Category, CategoryChanges, NewCategory, Store};
use crate::domain::Page;
use crate::services::category_service::{CategoryError, CategoryInput, CategoryService};

const DUPLICATE_NAME: &str = "Category with this name already exists";

pub struct SeaOrmCategoryService {
    store: Store,
}

impl SeaOrmCategoryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CategoryService for SeaOrmCategoryService {
    async fn create(&self, user_id: Uuid, input: CategoryInput) -> Result<Category, CategoryError> {
        let repo = self.store.categories();
        if repo.name_taken(user_id, &input.name, None).await? {
            return Err(CategoryError::Conflict(DUPLICATE_NAME.to_string()));
        }

        let category = repo
            .create(NewCategory {
                user_id,
                name: input.name,
                description: input.description,
                color: input.color,
                icon: input.icon,
                kind: input.kind,
            })
            .await?;

        Ok(category)
    }

    async fn list(&self, user_id: Uuid, page: Page) -> Result<Vec<Category>, CategoryError> {
        Ok(self.store.categories().list(user_id, page).await?)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Category, CategoryError> {
        self.store
            .categories()
            .get(user_id, id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, CategoryError> {
        let repo = self.store.categories();

        if let Some(name) = &changes.name
            && repo.name_taken(user_id, name, Some(id)).await?
        {
            // Only report the conflict for categories the caller can see
            if !repo.exists(user_id, id).await? {
                return Err(CategoryError::NotFound);
            }
            return Err(CategoryError::Conflict(DUPLICATE_NAME.to_string()));
        }

        repo.update(user_id, id, changes)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), CategoryError> {
        let repo = self.store.categories();
        if !repo.exists(user_id, id).await? {
            return Err(CategoryError::NotFound);
        }
        if repo.is_in_use(id).await? {
            return Err(CategoryError::InUse);
        }

        if repo.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(CategoryError::NotFound)
        }
    }
}
