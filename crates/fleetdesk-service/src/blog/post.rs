//! Blog post authoring and the public blog.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::text::{blank_to_none, reading_time};
use fleetdesk_core::types::{BulkIds, ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::BlogPostRepository;
use fleetdesk_entity::blog::{BlogPost, BlogPostData, BlogPostFilter, BlogPostInput, PostStatus};
use fleetdesk_storage::MediaStore;

use crate::paths::{self, tags};
use crate::support::{found, slug_for, validate};

const IMAGE_FOLDER: &str = "blog";

/// Post lists render category and tag names.
const LIST_TAGS: &[&str] = &[tags::BLOG_CATEGORIES, tags::BLOG_TAGS];

/// Manages blog posts.
#[derive(Clone)]
pub struct BlogPostService {
    /// Post repository.
    repo: Arc<dyn BlogPostRepository>,
    /// Image storage.
    media: MediaStore,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl BlogPostService {
    /// Creates a new blog post service.
    pub fn new(
        repo: Arc<dyn BlogPostRepository>,
        media: MediaStore,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            repo,
            media,
            pages,
            rbac,
        }
    }

    /// Lists posts in any status.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &BlogPostFilter,
    ) -> Result<PageResponse<BlogPost>, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_BLOG_POSTS, &query, LIST_TAGS, || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Gets one post by id.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<BlogPost, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        found(self.repo.find_by_id(id, OwnerScope::All).await?, "Blog post")
    }

    /// Published posts for the public blog, newest publication first.
    pub async fn public_list(
        &self,
        filter: BlogPostFilter,
    ) -> Result<PageResponse<BlogPost>, AppError> {
        let query = filter.published().to_list_query();
        self.pages
            .cached(paths::PUBLIC_BLOG, &query, LIST_TAGS, || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// A published post by slug. Drafts and archived posts are not found.
    pub async fn public_get(&self, slug: &str) -> Result<BlogPost, AppError> {
        let path = paths::detail(paths::PUBLIC_BLOG, slug);
        self.pages
            .cached(&path, slug, LIST_TAGS, || async {
                let post = found(self.repo.find_by_slug(slug).await?, "Blog post")?;
                if post.status != PostStatus::Published {
                    return Err(AppError::not_found("Blog post not found"));
                }
                Ok(post)
            })
            .await
    }

    /// Creates a post authored by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: BlogPostInput,
    ) -> Result<BlogPost, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let data = self.prepare(input, Some(ctx.user_id)).await?;

        let post = self.repo.create(&data).await?;
        self.revalidate(&post, None).await;

        info!(
            admin_id = %ctx.user_id,
            post_id = %post.id,
            slug = %post.slug,
            status = %post.status,
            "Blog post created"
        );
        Ok(post)
    }

    /// Replaces a post. The author and first publication time are kept.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: BlogPostInput,
    ) -> Result<BlogPost, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let previous = found(self.repo.find_by_id(id, OwnerScope::All).await?, "Blog post")?;
        let data = self.prepare(input, None).await?;

        let post = found(self.repo.update(id, &data).await?, "Blog post")?;
        self.revalidate(&post, Some(&previous.slug)).await;

        info!(
            admin_id = %ctx.user_id,
            post_id = %id,
            status = %post.status,
            "Blog post updated"
        );
        Ok(post)
    }

    /// Deletes a post and its tag links.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let post = found(self.repo.find_by_id(id, OwnerScope::All).await?, "Blog post")?;

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Blog post not found"));
        }
        self.revalidate(&post, None).await;

        info!(admin_id = %ctx.user_id, post_id = %id, slug = %post.slug, "Blog post deleted");
        Ok(())
    }

    /// Sets the status of many posts.
    pub async fn bulk_update_status(
        &self,
        ctx: &RequestContext,
        ids: &BulkIds,
        status: PostStatus,
    ) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let updated = self.repo.bulk_update_status(ids, status).await?;
        self.revalidate_lists().await;

        info!(
            admin_id = %ctx.user_id,
            requested = ids.len(),
            updated,
            status = %status,
            "Bulk blog post status update"
        );
        Ok(updated)
    }

    /// Deletes many posts.
    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &BulkIds) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let deleted = self.repo.bulk_delete(ids).await?;
        self.revalidate_lists().await;

        info!(admin_id = %ctx.user_id, requested = ids.len(), deleted, "Bulk blog post delete");
        Ok(deleted)
    }

    /// Flips `is_featured`.
    pub async fn toggle_featured(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<BlogPost, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let post = found(self.repo.toggle_featured(id).await?, "Blog post")?;
        self.revalidate(&post, None).await;

        info!(
            admin_id = %ctx.user_id,
            post_id = %id,
            is_featured = post.is_featured,
            "Blog post featured flag toggled"
        );
        Ok(post)
    }

    async fn prepare(
        &self,
        input: BlogPostInput,
        author_id: Option<Uuid>,
    ) -> Result<BlogPostData, AppError> {
        validate(&input)?;
        let slug = slug_for("slug", input.slug.as_deref(), &input.title)?;
        let featured_image = self
            .media
            .resolve_image(input.featured_image, IMAGE_FOLDER)
            .await?;

        let mut seen = HashSet::new();
        let tag_ids = input
            .tag_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        Ok(BlogPostData {
            title: input.title.trim().to_string(),
            slug,
            excerpt: blank_to_none(input.excerpt),
            reading_time: reading_time(&input.content),
            content: input.content,
            featured_image,
            category_id: input.category_id,
            author_id,
            status: input.status,
            is_featured: input.is_featured,
            meta_title: blank_to_none(input.meta_title),
            meta_description: blank_to_none(input.meta_description),
            tag_ids,
        })
    }

    /// Post writes change list rows, the public pages, and category/tag counts.
    async fn revalidate(&self, post: &BlogPost, old_slug: Option<&str>) {
        let admin_detail = paths::detail(paths::ADMIN_BLOG_POSTS, post.id);
        let public_detail = paths::detail(paths::PUBLIC_BLOG, &post.slug);
        let old_public = old_slug.map(|s| paths::detail(paths::PUBLIC_BLOG, s));

        let mut targets = vec![
            paths::ADMIN_BLOG_POSTS,
            admin_detail.as_str(),
            paths::PUBLIC_BLOG,
            public_detail.as_str(),
            paths::ADMIN_BLOG_CATEGORIES,
            paths::ADMIN_BLOG_TAGS,
        ];
        if let Some(old) = &old_public {
            targets.push(old);
        }
        self.pages.revalidate_paths(&targets).await;
    }

    async fn revalidate_lists(&self) {
        self.pages
            .revalidate_paths(&[
                paths::ADMIN_BLOG_POSTS,
                paths::PUBLIC_BLOG,
                paths::ADMIN_BLOG_CATEGORIES,
                paths::ADMIN_BLOG_TAGS,
            ])
            .await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;

    use super::*;
    use crate::testing::Fixture;

    fn input(title: &str, status: PostStatus) -> BlogPostInput {
        BlogPostInput {
            title: title.into(),
            slug: None,
            excerpt: Some("  ".into()),
            content: "word ".repeat(450),
            featured_image: None,
            category_id: None,
            status,
            is_featured: false,
            meta_title: None,
            meta_description: None,
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_reading_time() {
        let fx = Fixture::new().await;
        let post = fx
            .services
            .blog_posts
            .create(&fx.admin, input("Best Beaches in Bali", PostStatus::Draft))
            .await
            .unwrap();
        assert_eq!(post.slug, "best-beaches-in-bali");
        assert_eq!(post.reading_time, 3);
        assert_eq!(post.excerpt, None);
        assert_eq!(post.author_id, Some(fx.admin.user_id));
        assert!(post.published_at.is_none());
    }

    #[tokio::test]
    async fn test_published_at_is_set_once() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_posts;
        let draft = svc
            .create(&fx.admin, input("Ubud Day Trips", PostStatus::Draft))
            .await
            .unwrap();

        let published = svc
            .update(&fx.admin, draft.id, input("Ubud Day Trips", PostStatus::Published))
            .await
            .unwrap();
        let first = published.published_at.expect("published_at set");

        let edited = svc
            .update(&fx.admin, draft.id, input("Ubud Day Trips (2025)", PostStatus::Published))
            .await
            .unwrap();
        assert_eq!(edited.published_at, Some(first));
        assert_eq!(edited.slug, "ubud-day-trips-2025");
    }

    #[tokio::test]
    async fn test_public_get_hides_drafts() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_posts;
        svc.create(&fx.admin, input("Hidden Draft", PostStatus::Draft))
            .await
            .unwrap();
        svc.create(&fx.admin, input("Visible Post", PostStatus::Published))
            .await
            .unwrap();

        let err = svc.public_get("hidden-draft").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(svc.public_get("visible-post").await.unwrap().title, "Visible Post");

        let page = svc.public_list(BlogPostFilter::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_public_list_sees_new_posts() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_posts;
        assert_eq!(svc.public_list(BlogPostFilter::default()).await.unwrap().total, 0);

        svc.create(&fx.admin, input("Nusa Penida Guide", PostStatus::Published))
            .await
            .unwrap();
        assert_eq!(svc.public_list(BlogPostFilter::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_vendor_cannot_write_posts() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let err = fx
            .services
            .blog_posts
            .create(&vendor, input("Sneaky Post", PostStatus::Published))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(fx.db.blog_posts.count(|_| true), 0);
    }
}
