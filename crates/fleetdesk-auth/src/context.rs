//! Caller identity resolved from the bearer token.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::types::OwnerScope;

use crate::jwt::Claims;

/// Role claim issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform staff; sees and edits every row.
    Admin,
    /// A transport business; sees only rows owned by its business id.
    #[serde(alias = "business")]
    Vendor,
    /// End customer; has no back-office access.
    Customer,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Customer => "customer",
        })
    }
}

/// The authenticated caller of one request.
///
/// Every service method takes one of these explicitly; there is no ambient
/// "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub business_id: Option<Uuid>,
    pub email: Option<String>,
}

impl RequestContext {
    /// Context for an admin user.
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Admin,
            business_id: None,
            email: None,
        }
    }

    /// Context for a user acting for `business_id`.
    pub fn vendor(user_id: Uuid, business_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Vendor,
            business_id: Some(business_id),
            email: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fail with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::unauthorized())
        }
    }

    /// The caller's business id; fails unless the caller is a vendor with one.
    pub fn require_vendor(&self) -> AppResult<Uuid> {
        match (self.role, self.business_id) {
            (UserRole::Vendor, Some(business_id)) => Ok(business_id),
            _ => Err(AppError::unauthorized()),
        }
    }

    /// Rows this caller may see: all for admins, their own for vendors.
    pub fn owner_scope(&self) -> AppResult<OwnerScope> {
        if self.is_admin() {
            return Ok(OwnerScope::All);
        }
        self.require_vendor().map(OwnerScope::Owner)
    }
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            business_id: claims.business_id,
            email: claims.email,
        }
    }
}
