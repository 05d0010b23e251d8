//! Blog category repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::blog::{BlogCategory, BlogCategoryInput};

use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Blog category reads and writes.
#[async_trait]
pub trait BlogCategoryRepository: ListRepository<BlogCategory> {
    /// Insert a category under the already-normalised `slug`.
    async fn create(&self, slug: &str, input: &BlogCategoryInput) -> AppResult<BlogCategory>;

    /// Replace a category's columns.
    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &BlogCategoryInput,
    ) -> AppResult<Option<BlogCategory>>;

    /// Flip `is_active`.
    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<BlogCategory>>;

    /// Delete a category. Callers check for dependent posts first.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

const POST_COUNT: &str = "(SELECT COUNT(*) FROM blog_posts p WHERE p.category_id = c.id)";

pub(crate) const CATEGORIES: Table = Table {
    name: "blog_categories",
    alias: "c",
    columns: "c.*, (SELECT COUNT(*) FROM blog_posts p WHERE p.category_id = c.id) AS post_count",
    from: "FROM blog_categories c",
    fields: &[
        ("id", "c.id"),
        ("name", "c.name"),
        ("slug", "c.slug"),
        ("is_active", "c.is_active"),
        ("display_order", "c.display_order"),
        ("post_count", POST_COUNT),
        ("created_at", "c.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgBlogCategoryRepository {
    pool: PgPool,
}

impl PgBlogCategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository<BlogCategory> for PgBlogCategoryRepository {
    async fn list(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<PageResponse<BlogCategory>> {
        query::fetch_page(&self.pool, &CATEGORIES, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogCategory>> {
        query::fetch_by_id(&self.pool, &CATEGORIES, id, scope).await
    }
}

#[async_trait]
impl BlogCategoryRepository for PgBlogCategoryRepository {
    async fn create(&self, slug: &str, input: &BlogCategoryInput) -> AppResult<BlogCategory> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO blog_categories (id, name, slug, description, image_url, is_active, display_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.is_active)
        .bind(input.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&CATEGORIES, e))?;

        query::fetch_existing(&self.pool, &CATEGORIES, id).await
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &BlogCategoryInput,
    ) -> AppResult<Option<BlogCategory>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE blog_categories SET name = $2, slug = $3, description = $4, image_url = $5, \
             is_active = $6, display_order = $7, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.is_active)
        .bind(input.display_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&CATEGORIES, e))?;

        match updated {
            Some(id) => query::fetch_existing(&self.pool, &CATEGORIES, id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<BlogCategory>> {
        if !query::toggle(&self.pool, &CATEGORIES, id, "is_active", OwnerScope::All).await? {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &CATEGORIES, id, OwnerScope::All).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &CATEGORIES, id, OwnerScope::All).await
    }
}

impl Record for BlogCategory {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "slug" => self.slug.as_str().into(),
            "is_active" => self.is_active.into(),
            "display_order" => self.display_order.into(),
            "post_count" => self.post_count.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryBlogCategoryRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryBlogCategoryRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn counted(&self, mut category: BlogCategory) -> BlogCategory {
        category.post_count = self
            .db
            .blog_posts
            .count(|p| p.category_id == Some(category.id)) as i64;
        category
    }

    fn ensure_unique_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self
            .db
            .blog_categories
            .any(|c| c.slug == slug && Some(c.id) != except)
        {
            return Err(AppError::conflict(messages::DUPLICATE_SLUG));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<BlogCategory> for MemoryBlogCategoryRepository {
    async fn list(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<PageResponse<BlogCategory>> {
        let rows = self
            .db
            .blog_categories
            .visible(scope)
            .into_iter()
            .map(|c| self.counted(c))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogCategory>> {
        Ok(self.db.blog_categories.get(id, scope).map(|c| self.counted(c)))
    }
}

#[async_trait]
impl BlogCategoryRepository for MemoryBlogCategoryRepository {
    async fn create(&self, slug: &str, input: &BlogCategoryInput) -> AppResult<BlogCategory> {
        self.ensure_unique_slug(slug, None)?;
        let now = Utc::now();
        let category = self.db.blog_categories.insert(BlogCategory {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            slug: slug.to_string(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            is_active: input.is_active,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
            post_count: 0,
        });
        Ok(category)
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &BlogCategoryInput,
    ) -> AppResult<Option<BlogCategory>> {
        self.ensure_unique_slug(slug, Some(id))?;
        Ok(self
            .db
            .blog_categories
            .update(id, OwnerScope::All, |c| {
                c.name = input.name.clone();
                c.slug = slug.to_string();
                c.description = input.description.clone();
                c.image_url = input.image_url.clone();
                c.is_active = input.is_active;
                c.display_order = input.display_order;
            })
            .map(|c| self.counted(c)))
    }

    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<BlogCategory>> {
        Ok(self
            .db
            .blog_categories
            .update(id, OwnerScope::All, |c| c.is_active = !c.is_active)
            .map(|c| self.counted(c)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.db.blog_posts.any(|p| p.category_id == Some(id)) {
            return Err(AppError::integrity(
                "Cannot delete from blog_categories: the record is still in use",
            ));
        }
        Ok(self.db.blog_categories.remove_many(&[id], OwnerScope::All) > 0)
    }
}
