//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::context::UserRole;

/// A back-office permission.
///
/// Row ownership is a separate check: a vendor holding `VehicleManage` may
/// still only touch vehicles of its own business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    // Bookings
    BookingView,
    /// Status and payment writes.
    BookingManage,
    /// CSV export.
    BookingExport,

    // Fleet
    VehicleView,
    VehicleManage,

    // Routes
    RouteView,
    RouteManage,
    /// Toggle the `is_popular` flag.
    RoutePromote,

    // Content
    /// Posts, categories, and tags.
    BlogManage,
    ReviewManage,

    // Platform settings
    CurrencyManage,
    PricingManage,

    /// Upload images to media storage.
    MediaUpload,
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<UserRole, HashSet<SystemPermission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        use SystemPermission::*;

        let mut policies = HashMap::new();

        // Vendor: its own bookings, fleet, and routes
        let vendor: HashSet<SystemPermission> = [
            BookingView,
            BookingManage,
            BookingExport,
            VehicleView,
            VehicleManage,
            RouteView,
            RouteManage,
            MediaUpload,
        ]
        .into_iter()
        .collect();
        policies.insert(UserRole::Vendor, vendor);

        // Admin: everything
        let admin: HashSet<SystemPermission> = [
            BookingView,
            BookingManage,
            BookingExport,
            VehicleView,
            VehicleManage,
            RouteView,
            RouteManage,
            RoutePromote,
            BlogManage,
            ReviewManage,
            CurrencyManage,
            PricingManage,
            MediaUpload,
        ]
        .into_iter()
        .collect();
        policies.insert(UserRole::Admin, admin);

        // Customer: nothing in the back office
        policies.insert(UserRole::Customer, HashSet::new());

        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: UserRole) -> HashSet<SystemPermission> {
        self.policies.get(&role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: UserRole, permission: SystemPermission) -> bool {
        self.policies
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
