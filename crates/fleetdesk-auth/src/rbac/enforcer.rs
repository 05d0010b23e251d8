//! RBAC enforcement: checks whether a caller holds a required permission.

use tracing::warn;

use fleetdesk_core::error::AppError;

use super::policies::{RbacPolicies, SystemPermission};
use crate::context::RequestContext;

/// Enforces role-based access control ahead of every service write.
#[derive(Debug, Clone)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// `Ok(())` if the caller's role grants `permission`, otherwise `Unauthorized`.
    pub fn require(
        &self,
        ctx: &RequestContext,
        permission: SystemPermission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(ctx.role, permission) {
            Ok(())
        } else {
            warn!(
                user_id = %ctx.user_id,
                role = %ctx.role,
                ?permission,
                "Permission denied"
            );
            Err(AppError::unauthorized())
        }
    }

    /// Checks whether the caller holds the permission.
    pub fn allows(&self, ctx: &RequestContext, permission: SystemPermission) -> bool {
        self.policies.has_permission(ctx.role, permission)
    }
}

impl Default for RbacEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::context::UserRole;
    use fleetdesk_core::error::ErrorKind;

    #[test]
    fn test_admin_holds_every_permission() {
        let rbac = RbacEnforcer::new();
        let admin = RequestContext::admin(Uuid::new_v4());
        assert!(rbac.require(&admin, SystemPermission::CurrencyManage).is_ok());
        assert!(rbac.require(&admin, SystemPermission::RoutePromote).is_ok());
    }

    #[test]
    fn test_vendor_cannot_manage_content() {
        let rbac = RbacEnforcer::new();
        let vendor = RequestContext::vendor(Uuid::new_v4(), Uuid::new_v4());
        assert!(rbac.allows(&vendor, SystemPermission::VehicleManage));
        let err = rbac.require(&vendor, SystemPermission::BlogManage).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(!rbac.allows(&vendor, SystemPermission::RoutePromote));
    }

    #[test]
    fn test_customer_has_no_access() {
        let rbac = RbacEnforcer::new();
        let customer = RequestContext {
            role: UserRole::Customer,
            ..RequestContext::admin(Uuid::new_v4())
        };
        assert!(!rbac.allows(&customer, SystemPermission::BookingView));
    }
}
