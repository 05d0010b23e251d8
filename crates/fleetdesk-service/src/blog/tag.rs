//! Blog tags.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::{BlogPostRepository, BlogTagRepository};
use fleetdesk_entity::blog::{BlogTag, BlogTagFilter, BlogTagInput};

use crate::paths::{self, tags};
use crate::support::{found, slug_for, validate};

/// Manages blog tags.
#[derive(Clone)]
pub struct BlogTagService {
    repo: Arc<dyn BlogTagRepository>,
    posts: Arc<dyn BlogPostRepository>,
    pages: Revalidator,
    rbac: Arc<RbacEnforcer>,
}

impl BlogTagService {
    /// Creates a new blog tag service.
    pub fn new(
        repo: Arc<dyn BlogTagRepository>,
        posts: Arc<dyn BlogPostRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            repo,
            posts,
            pages,
            rbac,
        }
    }

    /// Lists tags with their post counts.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &BlogTagFilter,
    ) -> Result<PageResponse<BlogTag>, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_BLOG_TAGS, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Gets one tag.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<BlogTag, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        found(self.repo.find_by_id(id, OwnerScope::All).await?, "Tag")
    }

    /// Creates a tag.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut input: BlogTagInput,
    ) -> Result<BlogTag, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        input.name = input.name.trim().to_string();
        validate(&input)?;
        let slug = slug_for("slug", input.slug.as_deref(), &input.name)?;

        let tag = self.repo.create(&slug, &input).await?;
        self.revalidate(tag.id).await;

        info!(admin_id = %ctx.user_id, tag_id = %tag.id, slug = %tag.slug, "Blog tag created");
        Ok(tag)
    }

    /// Replaces a tag's fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut input: BlogTagInput,
    ) -> Result<BlogTag, AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;
        input.name = input.name.trim().to_string();
        validate(&input)?;
        let slug = slug_for("slug", input.slug.as_deref(), &input.name)?;

        let tag = found(self.repo.update(id, &slug, &input).await?, "Tag")?;
        self.revalidate(id).await;

        info!(admin_id = %ctx.user_id, tag_id = %id, "Blog tag updated");
        Ok(tag)
    }

    /// Deletes a tag that no post uses.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::BlogManage)?;

        let in_use = self.posts.count_by_tag(id).await?;
        if in_use > 0 {
            warn!(tag_id = %id, in_use, "Refusing to delete tag in use");
            return Err(AppError::integrity(format!(
                "Cannot delete tag. {in_use} blog posts use this tag."
            )));
        }
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Tag not found"));
        }
        self.revalidate(id).await;

        info!(admin_id = %ctx.user_id, tag_id = %id, "Blog tag deleted");
        Ok(())
    }

    async fn revalidate(&self, id: Uuid) {
        let detail = paths::detail(paths::ADMIN_BLOG_TAGS, id);
        self.pages
            .revalidate_paths(&[paths::ADMIN_BLOG_TAGS, &detail, paths::PUBLIC_BLOG])
            .await;
        self.pages.revalidate_tag(tags::BLOG_TAGS).await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use fleetdesk_entity::blog::{BlogPostInput, PostStatus};

    use super::*;
    use crate::testing::Fixture;

    fn input(name: &str) -> BlogTagInput {
        BlogTagInput {
            name: name.into(),
            slug: None,
        }
    }

    #[tokio::test]
    async fn test_guarded_delete() {
        let fx = Fixture::new().await;
        let svc = &fx.services.blog_tags;
        let tag = svc.create(&fx.admin, input("Family Travel")).await.unwrap();
        assert_eq!(tag.slug, "family-travel");

        fx.services
            .blog_posts
            .create(
                &fx.admin,
                BlogPostInput {
                    title: "Kid-friendly Bali".into(),
                    slug: None,
                    excerpt: None,
                    content: "Body".into(),
                    featured_image: None,
                    category_id: None,
                    status: PostStatus::Published,
                    is_featured: false,
                    meta_title: None,
                    meta_description: None,
                    tag_ids: vec![tag.id, tag.id],
                },
            )
            .await
            .unwrap();

        let err = svc.delete(&fx.admin, tag.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert_eq!(err.message, "Cannot delete tag. 1 blog posts use this tag.");
        assert_eq!(svc.get(&fx.admin, tag.id).await.unwrap().post_count, 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let fx = Fixture::new().await;
        let err = fx
            .services
            .blog_tags
            .create(&fx.admin, input("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
