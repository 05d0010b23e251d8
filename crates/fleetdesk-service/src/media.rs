//! Direct image uploads from admin and vendor forms.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_core::error::AppError;
use fleetdesk_storage::{MediaStore, UploadedMedia};

/// Folders an upload may target.
pub const UPLOAD_FOLDERS: &[&str] = &["vehicles", "blog", "blog/categories", "routes", "misc"];

/// Stores uploaded images.
#[derive(Clone)]
pub struct MediaService {
    store: MediaStore,
    rbac: Arc<RbacEnforcer>,
}

impl MediaService {
    /// Creates a new media service.
    pub fn new(store: MediaStore, rbac: Arc<RbacEnforcer>) -> Self {
        Self { store, rbac }
    }

    /// Stores one image and returns its public URL.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        folder: Option<&str>,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadedMedia, AppError> {
        self.rbac.require(ctx, SystemPermission::MediaUpload)?;
        let folder = folder.map(str::trim).filter(|f| !f.is_empty()).unwrap_or("misc");
        if !UPLOAD_FOLDERS.contains(&folder) {
            return Err(AppError::invalid_field(
                "folder",
                format!("Unknown upload folder '{folder}'"),
            ));
        }

        let media = self.store.upload(folder, data, content_type).await?;
        info!(user_id = %ctx.user_id, path = %media.path, size = media.size, "Image uploaded");
        Ok(media)
    }
}
