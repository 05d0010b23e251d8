//! Blog categories.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::text::blank_to_none;
use fleetdesk_core::types::{ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::{BlogCategoryRepository, BlogPostRepository};
use fleetdesk_entity::blog::{BlogCategory, BlogCategoryFilter, BlogCategoryInput};
use fleetdesk_storage::MediaStore;

use crate::paths::{self, tags};
use crate::support::{found, slug_for, validate};

const IMAGE_FOLDER: &str = "blog/categories";

/// Manages blog categories.
#[derive(Clone)]
pub struct BlogCategoryService {
    repo: Arc<dyn BlogCategoryRepository>,
    posts: Arc<dyn BlogPostRepository>,
    media: MediaStore,
    pages: Revalidator,
    rbac: Arc<RbacEnforcer>,
}

impl BlogCategoryService {
    /// Creates a new blog category service.
    pub fn new(
        repo: Arc<dyn BlogCategoryRepository>,
        posts: Arc<dyn BlogPostRepository>,
        media: MediaStore,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            repo,
            posts,
            media,
            pages,
            rbac,
        }
    }

    /// Lists categories with their post counts.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &BlogCategoryFilter,
    ) -> Result<PageResponse<BlogCategory>, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_BLOG_CATEGORIES, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Gets one category.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<BlogCategory, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        found(self.repo.find_by_id(id, OwnerScope::All).await?, "Category")
    }

    /// Creates a category.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: BlogCategoryInput,
    ) -> Result<BlogCategory, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let (slug, input) = self.prepare(input).await?;

        let category = self.repo.create(&slug, &input).await?;
        self.revalidate(category.id).await;

        info!(
            admin_id = %ctx.user_id,
            category_id = %category.id,
            slug = %category.slug,
            "Blog category created"
        );
        Ok(category)
    }

    /// Replaces a category's fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: BlogCategoryInput,
    ) -> Result<BlogCategory, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let (slug, input) = self.prepare(input).await?;

        let category = found(self.repo.update(id, &slug, &input).await?, "Category")?;
        self.revalidate(id).await;

        info!(admin_id = %ctx.user_id, category_id = %id, "Blog category updated");
        Ok(category)
    }

    /// Flips `is_active`.
    pub async fn toggle_active(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<BlogCategory, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let category = found(self.repo.toggle_active(id).await?, "Category")?;
        self.revalidate(id).await;

        info!(
            admin_id = %ctx.user_id,
            category_id = %id,
            is_active = category.is_active,
            "Blog category toggled"
        );
        Ok(category)
    }

    /// Deletes a category that no post uses.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let in_use = self.posts.count_by_category(id).await?;
        if in_use > 0 {
            warn!(category_id = %id, in_use, "Refusing to delete category in use");
            return Err(AppError::integrity(format!(
                "Cannot delete category. {in_use} blog posts use this category."
            )));
        }
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Category not found"));
        }
        self.revalidate(id).await;

        info!(admin_id = %ctx.user_id, category_id = %id, "Blog category deleted");
        Ok(())
    }

    async fn prepare(
        &self,
        mut input: BlogCategoryInput,
    ) -> Result<(String, BlogCategoryInput), AppError> {
        input.name = input.name.trim().to_string();
        validate(&input)?;
        let slug = slug_for("slug", input.slug.as_deref(), &input.name)?;
        input.description = blank_to_none(input.description);
        input.image_url = self
            .media
            .resolve_image(input.image_url.take(), IMAGE_FOLDER)
            .await?;
        Ok((slug, input))
    }

    async fn revalidate(&self, id: Uuid) {
        let detail = paths::detail(paths::ADMIN_BLOG_CATEGORIES, id);
        self.pages
            .revalidate_paths(&[paths::ADMIN_BLOG_CATEGORIES, &detail, paths::PUBLIC_BLOG])
            .await;
        self.pages.revalidate_tag(tags::BLOG_CATEGORIES).await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use fleetdesk_entity::blog::{BlogPostInput, PostStatus};

    use super::*;
    use crate::testing::Fixture;

    fn input(name: &str, slug: Option<&str>) -> BlogCategoryInput {
        BlogCategoryInput {
            name: name.into(),
            slug: slug.map(Into::into),
            description: None,
            image_url: None,
            is_active: true,
            display_order: 0,
        }
    }

    fn post(title: &str, category_id: Uuid) -> BlogPostInput {
        BlogPostInput {
            title: title.into(),
            slug: None,
            excerpt: None,
            content: "Short body".into(),
            featured_image: None,
            category_id: Some(category_id),
            status: PostStatus::Draft,
            is_featured: false,
            meta_title: None,
            meta_description: None,
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_slug_is_normalised() {
        let fx = Fixture::new().await;
        let category = fx
            .services
            .blog_categories
            .create(&fx.admin, input("Travel Tips", Some("Travel Tips")))
            .await
            .unwrap();
        assert_eq!(category.slug, "travel-tips");
        assert!(category.is_active);
    }

    #[tokio::test]
    async fn test_accented_name_gets_ascii_slug() {
        let fx = Fixture::new().await;
        let category = fx
            .services
            .blog_categories
            .create(&fx.admin, input("Café Culture", None))
            .await
            .unwrap();
        assert_eq!(category.name, "Café Culture");
        assert_eq!(category.slug, "cafe-culture");
    }

    #[tokio::test]
    async fn test_delete_in_use_reports_count() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_categories;
        let category = svc
            .create(&fx.admin, input("Destinations", None))
            .await
            .unwrap();
        for title in ["Ubud Guide", "Canggu Guide", "Seminyak Guide"] {
            fx.services
                .blog_posts
                .create(&fx.admin, post(title, category.id))
                .await
                .unwrap();
        }

        let err = svc.delete(&fx.admin, category.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert_eq!(
            err.message,
            "Cannot delete category. 3 blog posts use this category."
        );
        let kept = svc.get(&fx.admin, category.id).await.unwrap();
        assert_eq!(kept.post_count, 3);
    }

    #[tokio::test]
    async fn test_delete_unused() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_categories;
        let category = svc.create(&fx.admin, input("Empty", None)).await.unwrap();
        svc.delete(&fx.admin, category.id).await.unwrap();

        let err = svc.get(&fx.admin, category.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_reaches_cached_post_list() {
        let fx = Fixture::new().await;
        let category = fx
            .services
            .blog_categories
            .create(&fx.admin, input("News", None))
            .await
            .unwrap();
        fx.services
            .blog_posts
            .create(&fx.admin, post("Airport Update", category.id))
            .await
            .unwrap();

        let filter = fleetdesk_entity::blog::BlogPostFilter::default();
        let before = fx.services.blog_posts.list(&fx.admin, &filter).await.unwrap();
        assert_eq!(before.items[0].category_name.as_deref(), Some("News"));

        fx.services
            .blog_categories
            .update(&fx.admin, category.id, input("Announcements", Some("news")))
            .await
            .unwrap();
        let after = fx.services.blog_posts.list(&fx.admin, &filter).await.unwrap();
        assert_eq!(after.items[0].category_name.as_deref(), Some("Announcements"));
    }
}
