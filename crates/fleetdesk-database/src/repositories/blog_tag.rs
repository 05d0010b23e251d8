//! Blog tag repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::blog::{BlogTag, BlogTagInput};

use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Blog tag reads and writes.
#[async_trait]
pub trait BlogTagRepository: ListRepository<BlogTag> {
    /// Insert a tag under the already-normalised `slug`.
    async fn create(&self, slug: &str, input: &BlogTagInput) -> AppResult<BlogTag>;

    /// Rename a tag.
    async fn update(&self, id: Uuid, slug: &str, input: &BlogTagInput)
    -> AppResult<Option<BlogTag>>;

    /// Delete a tag. Callers check for dependent posts first.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub(crate) const TAGS: Table = Table {
    name: "blog_tags",
    alias: "t",
    columns: "t.*, (SELECT COUNT(*) FROM blog_post_tags pt WHERE pt.tag_id = t.id) AS post_count",
    from: "FROM blog_tags t",
    fields: &[
        ("id", "t.id"),
        ("name", "t.name"),
        ("slug", "t.slug"),
        (
            "post_count",
            "(SELECT COUNT(*) FROM blog_post_tags pt WHERE pt.tag_id = t.id)",
        ),
        ("created_at", "t.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgBlogTagRepository {
    pool: PgPool,
}

impl PgBlogTagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository<BlogTag> for PgBlogTagRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<BlogTag>> {
        query::fetch_page(&self.pool, &TAGS, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogTag>> {
        query::fetch_by_id(&self.pool, &TAGS, id, scope).await
    }
}

#[async_trait]
impl BlogTagRepository for PgBlogTagRepository {
    async fn create(&self, slug: &str, input: &BlogTagInput) -> AppResult<BlogTag> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO blog_tags (id, name, slug) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&TAGS, e))?;

        query::fetch_existing(&self.pool, &TAGS, id).await
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &BlogTagInput,
    ) -> AppResult<Option<BlogTag>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE blog_tags SET name = $2, slug = $3, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&TAGS, e))?;

        match updated {
            Some(id) => query::fetch_existing(&self.pool, &TAGS, id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &TAGS, id, OwnerScope::All).await
    }
}

impl Record for BlogTag {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "slug" => self.slug.as_str().into(),
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
pub struct MemoryBlogTagRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryBlogTagRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn counted(&self, mut tag: BlogTag) -> BlogTag {
        tag.post_count = self.db.blog_posts.count(|p| p.tag_ids.contains(&tag.id)) as i64;
        tag
    }

    fn ensure_unique_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self
            .db
            .blog_tags
            .any(|t| t.slug == slug && Some(t.id) != except)
        {
            return Err(AppError::conflict(messages::DUPLICATE_SLUG));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<BlogTag> for MemoryBlogTagRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<BlogTag>> {
        let rows = self
            .db
            .blog_tags
            .visible(scope)
            .into_iter()
            .map(|t| self.counted(t))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogTag>> {
        Ok(self.db.blog_tags.get(id, scope).map(|t| self.counted(t)))
    }
}

#[async_trait]
impl BlogTagRepository for MemoryBlogTagRepository {
    async fn create(&self, slug: &str, input: &BlogTagInput) -> AppResult<BlogTag> {
        self.ensure_unique_slug(slug, None)?;
        let now = Utc::now();
        Ok(self.db.blog_tags.insert(BlogTag {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
            post_count: 0,
        }))
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &BlogTagInput,
    ) -> AppResult<Option<BlogTag>> {
        self.ensure_unique_slug(slug, Some(id))?;
        Ok(self
            .db
            .blog_tags
            .update(id, OwnerScope::All, |t| {
                t.name = input.name.clone();
                t.slug = slug.to_string();
            })
            .map(|t| self.counted(t)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.db.blog_posts.any(|p| p.tag_ids.contains(&id)) {
            return Err(AppError::integrity(
                "Cannot delete from blog_tags: the record is still in use",
            ));
        }
        Ok(self.db.blog_tags.remove_many(&[id], OwnerScope::All) > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rename_keeps_id() {
        let repo = MemoryBlogTagRepository::new(Arc::new(MemoryDatabase::new()));
        let tag = repo
            .create(
                "bali",
                &BlogTagInput {
                    name: "Bali".into(),
                    slug: None,
                },
            )
            .await
            .unwrap();
        let renamed = repo
            .update(
                tag.id,
                "bali-island",
                &BlogTagInput {
                    name: "Bali Island".into(),
                    slug: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.id, tag.id);
        assert_eq!(renamed.slug, "bali-island");
    }

    #[tokio::test]
    async fn test_missing_tag_update_is_none() {
        let repo = MemoryBlogTagRepository::new(Arc::new(MemoryDatabase::new()));
        let input = BlogTagInput {
            name: "Java".into(),
            slug: None,
        };
        assert!(repo.update(Uuid::new_v4(), "java", &input).await.unwrap().is_none());
    }
}
