//! Role guards for the admin and vendor surfaces.
//!
//! These reject the wrong audience early. Services still check permissions
//! and row ownership on every call.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Only admins may reach `/api/admin`.
pub async fn require_admin(
    auth: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth.require_admin()?;
    Ok(next.run(request).await)
}

/// Only vendors acting for a business may reach `/api/vendor`.
pub async fn require_vendor(
    auth: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    auth.require_vendor()?;
    Ok(next.run(request).await)
}
