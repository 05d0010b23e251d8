//! Blog post repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetdesk_core::error::{AppError, ErrorKind};
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{BulkIds, FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::blog::{BlogPost, BlogPostData, PostStatus};

use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Blog post reads and writes. Posts have no per-vendor owner.
#[async_trait]
pub trait BlogPostRepository: ListRepository<BlogPost> {
    /// Find a post by its slug.
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<BlogPost>>;

    /// Insert a post and attach its tags.
    async fn create(&self, data: &BlogPostData) -> AppResult<BlogPost>;

    /// Replace a post's columns and tag set. `author_id` is kept.
    async fn update(&self, id: Uuid, data: &BlogPostData) -> AppResult<Option<BlogPost>>;

    /// Delete a post and its tag links.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Set the status of many posts.
    async fn bulk_update_status(&self, ids: &BulkIds, status: PostStatus) -> AppResult<u64>;

    /// Delete many posts.
    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64>;

    /// Flip `is_featured`.
    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<BlogPost>>;

    /// Posts filed under a category.
    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64>;

    /// Posts carrying a tag.
    async fn count_by_tag(&self, tag_id: Uuid) -> AppResult<i64>;
}

pub(crate) const POSTS: Table = Table {
    name: "blog_posts",
    alias: "p",
    columns: "p.*, c.name AS category_name, \
              ARRAY(SELECT t.id FROM blog_post_tags pt JOIN blog_tags t ON t.id = pt.tag_id \
                    WHERE pt.post_id = p.id ORDER BY t.name) AS tag_ids, \
              ARRAY(SELECT t.name FROM blog_post_tags pt JOIN blog_tags t ON t.id = pt.tag_id \
                    WHERE pt.post_id = p.id ORDER BY t.name) AS tag_names",
    from: "FROM blog_posts p LEFT JOIN blog_categories c ON c.id = p.category_id",
    fields: &[
        ("id", "p.id"),
        ("title", "p.title"),
        ("excerpt", "p.excerpt"),
        ("slug", "p.slug"),
        ("status", "p.status::text"),
        ("category_id", "p.category_id"),
        ("is_featured", "p.is_featured"),
        ("reading_time", "p.reading_time"),
        ("published_at", "p.published_at"),
        ("created_at", "p.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgBlogPostRepository {
    pool: PgPool,
}

impl PgBlogPostRepository {
    /// Create a new blog post repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
    }

    async fn replace_tags(
        tx: &mut Transaction<'static, Postgres>,
        post_id: Uuid,
        tag_ids: &[Uuid],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM blog_post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| query::write_error(&POSTS, e))?;
        if !tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO blog_post_tags (post_id, tag_id) SELECT $1, UNNEST($2::uuid[])",
            )
            .bind(post_id)
            .bind(tag_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| query::write_error(&POSTS, e))?;
        }
        Ok(())
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit blog post", e))
    }
}

#[async_trait]
impl ListRepository<BlogPost> for PgBlogPostRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<BlogPost>> {
        query::fetch_page(&self.pool, &POSTS, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogPost>> {
        query::fetch_by_id(&self.pool, &POSTS, id, scope).await
    }
}

#[async_trait]
impl BlogPostRepository for PgBlogPostRepository {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<BlogPost>> {
        let sql = format!("SELECT {} {} WHERE p.slug = $1", POSTS.columns, POSTS.from);
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find blog post", e))
    }

    async fn create(&self, data: &BlogPostData) -> AppResult<BlogPost> {
        let id = Uuid::new_v4();
        let mut tx = self.begin().await?;
        sqlx::query(
            "INSERT INTO blog_posts (id, title, slug, excerpt, content, featured_image, category_id, \
             author_id, status, is_featured, reading_time, meta_title, meta_description, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
             CASE WHEN $14 THEN NOW() END)",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.excerpt)
        .bind(&data.content)
        .bind(&data.featured_image)
        .bind(data.category_id)
        .bind(data.author_id)
        .bind(data.status)
        .bind(data.is_featured)
        .bind(data.reading_time)
        .bind(&data.meta_title)
        .bind(&data.meta_description)
        .bind(data.status == PostStatus::Published)
        .execute(&mut *tx)
        .await
        .map_err(|e| query::write_error(&POSTS, e))?;

        Self::replace_tags(&mut tx, id, &data.tag_ids).await?;
        Self::commit(tx).await?;
        query::fetch_existing(&self.pool, &POSTS, id).await
    }

    async fn update(&self, id: Uuid, data: &BlogPostData) -> AppResult<Option<BlogPost>> {
        let mut tx = self.begin().await?;
        let result = sqlx::query(
            "UPDATE blog_posts SET title = $2, slug = $3, excerpt = $4, content = $5, \
             featured_image = $6, category_id = $7, status = $8, is_featured = $9, \
             reading_time = $10, meta_title = $11, meta_description = $12, \
             published_at = CASE WHEN $13 THEN COALESCE(published_at, NOW()) ELSE published_at END, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.excerpt)
        .bind(&data.content)
        .bind(&data.featured_image)
        .bind(data.category_id)
        .bind(data.status)
        .bind(data.is_featured)
        .bind(data.reading_time)
        .bind(&data.meta_title)
        .bind(&data.meta_description)
        .bind(data.status == PostStatus::Published)
        .execute(&mut *tx)
        .await
        .map_err(|e| query::write_error(&POSTS, e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::replace_tags(&mut tx, id, &data.tag_ids).await?;
        Self::commit(tx).await?;
        query::fetch_existing(&self.pool, &POSTS, id).await.map(Some)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &POSTS, id, OwnerScope::All).await
    }

    async fn bulk_update_status(&self, ids: &BulkIds, status: PostStatus) -> AppResult<u64> {
        sqlx::query(
            "UPDATE blog_posts SET status = $2, \
             published_at = CASE WHEN $3 THEN COALESCE(published_at, NOW()) ELSE published_at END, \
             updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids.as_slice())
        .bind(status)
        .bind(status == PostStatus::Published)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| query::write_error(&POSTS, e))
    }

    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64> {
        query::delete_many(&self.pool, &POSTS, ids.as_slice(), OwnerScope::All).await
    }

    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<BlogPost>> {
        if !query::toggle(&self.pool, &POSTS, id, "is_featured", OwnerScope::All).await? {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &POSTS, id, OwnerScope::All).await
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count posts", e))
    }

    async fn count_by_tag(&self, tag_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM blog_post_tags WHERE tag_id = $1")
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count posts", e))
    }
}

impl Record for BlogPost {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "title" => self.title.as_str().into(),
            "excerpt" => self.excerpt.clone().into(),
            "slug" => self.slug.as_str().into(),
            "status" => self.status.as_str().into(),
            "category_id" => self.category_id.into(),
            "is_featured" => self.is_featured.into(),
            "reading_time" => self.reading_time.into(),
            "published_at" => self.published_at.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation. Tag links live on the post row.
#[derive(Debug, Clone)]
pub struct MemoryBlogPostRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryBlogPostRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut post: BlogPost) -> BlogPost {
        post.category_name = post
            .category_id
            .and_then(|id| self.db.blog_categories.get(id, OwnerScope::All))
            .map(|c| c.name);

        let mut tags: Vec<_> = post
            .tag_ids
            .iter()
            .filter_map(|id| self.db.blog_tags.get(*id, OwnerScope::All))
            .map(|t| (t.name, t.id))
            .collect();
        tags.sort();
        post.tag_ids = tags.iter().map(|(_, id)| *id).collect();
        post.tag_names = tags.into_iter().map(|(name, _)| name).collect();
        post
    }

    fn check_write(&self, data: &BlogPostData, except: Option<Uuid>) -> AppResult<()> {
        if self
            .db
            .blog_posts
            .any(|p| p.slug == data.slug && Some(p.id) != except)
        {
            return Err(AppError::conflict(messages::DUPLICATE_SLUG));
        }
        let missing_category = data
            .category_id
            .is_some_and(|id| self.db.blog_categories.get(id, OwnerScope::All).is_none());
        let missing_tag = data
            .tag_ids
            .iter()
            .any(|id| self.db.blog_tags.get(*id, OwnerScope::All).is_none());
        if missing_category || missing_tag {
            return Err(AppError::validation("A referenced record does not exist"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<BlogPost> for MemoryBlogPostRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<BlogPost>> {
        let rows = self
            .db
            .blog_posts
            .visible(scope)
            .into_iter()
            .map(|p| self.joined(p))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<BlogPost>> {
        Ok(self.db.blog_posts.get(id, scope).map(|p| self.joined(p)))
    }
}

#[async_trait]
impl BlogPostRepository for MemoryBlogPostRepository {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<BlogPost>> {
        Ok(self
            .db
            .blog_posts
            .visible(OwnerScope::All)
            .into_iter()
            .find(|p| p.slug == slug)
            .map(|p| self.joined(p)))
    }

    async fn create(&self, data: &BlogPostData) -> AppResult<BlogPost> {
        self.check_write(data, None)?;
        let now = Utc::now();
        let post = self.db.blog_posts.insert(BlogPost {
            id: Uuid::new_v4(),
            title: data.title.clone(),
            slug: data.slug.clone(),
            excerpt: data.excerpt.clone(),
            content: data.content.clone(),
            featured_image: data.featured_image.clone(),
            category_id: data.category_id,
            author_id: data.author_id,
            status: data.status,
            is_featured: data.is_featured,
            reading_time: data.reading_time,
            meta_title: data.meta_title.clone(),
            meta_description: data.meta_description.clone(),
            published_at: data.status.published_at(None, now),
            created_at: now,
            updated_at: now,
            category_name: None,
            tag_ids: data.tag_ids.clone(),
            tag_names: Vec::new(),
        });
        Ok(self.joined(post))
    }

    async fn update(&self, id: Uuid, data: &BlogPostData) -> AppResult<Option<BlogPost>> {
        self.check_write(data, Some(id))?;
        let now = Utc::now();
        Ok(self
            .db
            .blog_posts
            .update(id, OwnerScope::All, |p| {
                p.title = data.title.clone();
                p.slug = data.slug.clone();
                p.excerpt = data.excerpt.clone();
                p.content = data.content.clone();
                p.featured_image = data.featured_image.clone();
                p.category_id = data.category_id;
                p.status = data.status;
                p.is_featured = data.is_featured;
                p.reading_time = data.reading_time;
                p.meta_title = data.meta_title.clone();
                p.meta_description = data.meta_description.clone();
                p.published_at = data.status.published_at(p.published_at, now);
                p.tag_ids = data.tag_ids.clone();
            })
            .map(|p| self.joined(p)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.db.blog_posts.remove_many(&[id], OwnerScope::All) > 0)
    }

    async fn bulk_update_status(&self, ids: &BulkIds, status: PostStatus) -> AppResult<u64> {
        let now = Utc::now();
        Ok(self
            .db
            .blog_posts
            .update_many(ids.as_slice(), OwnerScope::All, |p| {
                p.status = status;
                p.published_at = status.published_at(p.published_at, now);
            }))
    }

    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64> {
        Ok(self.db.blog_posts.remove_many(ids.as_slice(), OwnerScope::All))
    }

    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<BlogPost>> {
        Ok(self
            .db
            .blog_posts
            .update(id, OwnerScope::All, |p| p.is_featured = !p.is_featured)
            .map(|p| self.joined(p)))
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64> {
        Ok(self
            .db
            .blog_posts
            .count(|p| p.category_id == Some(category_id)) as i64)
    }

    async fn count_by_tag(&self, tag_id: Uuid) -> AppResult<i64> {
        Ok(self.db.blog_posts.count(|p| p.tag_ids.contains(&tag_id)) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(slug: &str, status: PostStatus) -> BlogPostData {
        BlogPostData {
            title: "Getting from the airport to Ubud".into(),
            slug: slug.into(),
            excerpt: None,
            content: "<p>Book ahead.</p>".into(),
            featured_image: None,
            category_id: None,
            author_id: Some(Uuid::new_v4()),
            status,
            is_featured: false,
            reading_time: 1,
            meta_title: None,
            meta_description: None,
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn test_select_aggregates_tags() {
        let qb = POSTS.by_id_query(Uuid::new_v4(), OwnerScope::All);
        assert!(qb.sql().contains("AS tag_names"));
        assert!(qb.sql().ends_with("WHERE p.id = $1"));
    }

    #[tokio::test]
    async fn test_published_at_survives_edits() {
        let repo = MemoryBlogPostRepository::new(Arc::new(MemoryDatabase::new()));
        let draft = repo.create(&data("airport-ubud", PostStatus::Draft)).await.unwrap();
        assert!(draft.published_at.is_none());

        let published = repo
            .update(draft.id, &data("airport-ubud", PostStatus::Published))
            .await
            .unwrap()
            .unwrap();
        let first = published.published_at.unwrap();

        let edited = repo
            .update(draft.id, &data("airport-ubud", PostStatus::Published))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.published_at, Some(first));
        assert_eq!(edited.author_id, draft.author_id);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_rejected() {
        let repo = MemoryBlogPostRepository::new(Arc::new(MemoryDatabase::new()));
        let mut input = data("with-tag", PostStatus::Draft);
        input.tag_ids.push(Uuid::new_v4());
        let err = repo.create(&input).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
