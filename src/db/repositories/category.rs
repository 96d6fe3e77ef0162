use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{CategoryKind, Page};
use crate::entities::{budgets, categories, prelude::*, transactions};

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<categories::Model> for Category {
    type Error = anyhow::Error;

    fn try_from(model: categories::Model) -> Result<Self> {
        Ok(Self {
            kind: model.kind.parse()?,
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            color: model.color,
            icon: model.icon,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub kind: CategoryKind,
}

#[derive(Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub kind: Option<CategoryKind>,
}

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewCategory) -> Result<Category> {
        let now = Utc::now();
        let model = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            name: Set(new.name),
            description: Set(new.description),
            color: Set(new.color),
            icon: Set(new.icon),
            kind: Set(new.kind.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")?;

        Category::try_from(model)
    }

    pub async fn list(&self, user_id: Uuid, page: Page) -> Result<Vec<Category>> {
        let rows = Categories::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("Failed to list categories")?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Fetches a category only if `user_id` owns it.
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Category>> {
        let row = self.find_owned(user_id, id).await?;
        row.map(Category::try_from).transpose()
    }

    pub async fn exists(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let count = Categories::find()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to check category ownership")?;

        Ok(count > 0)
    }

    pub async fn name_taken(&self, user_id: Uuid, name: &str, except: Option<Uuid>) -> Result<bool> {
        let mut query = Categories::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to check category name")?;

        Ok(count > 0)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>> {
        let Some(row) = self.find_owned(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: categories::ActiveModel = row.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(icon) = changes.icon {
            active.icon = Set(icon);
        }
        if let Some(kind) = changes.kind {
            active.kind = Set(kind.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update category")?;

        Category::try_from(model).map(Some)
    }

    /// True when any transaction or budget still points at the category.
    pub async fn is_in_use(&self, id: Uuid) -> Result<bool> {
        let transactions = Transactions::find()
            .filter(transactions::Column::CategoryId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count category transactions")?;
        if transactions > 0 {
            return Ok(true);
        }

        let budgets = Budgets::find()
            .filter(budgets::Column::CategoryId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count category budgets")?;

        Ok(budgets > 0)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = Categories::delete_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected > 0)
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query category")
    }
}
