//! Row ownership scope applied to every list, read, and write.

use serde::Serialize;
use uuid::Uuid;

/// Which rows a caller may see or touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "owner", rename_all = "snake_case")]
pub enum OwnerScope {
    /// Every row (administrators).
    All,
    /// Only rows owned by this account (a vendor's business id).
    Owner(Uuid),
}

impl OwnerScope {
    /// The owning account id, if the scope is restricted.
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            Self::All => None,
            Self::Owner(id) => Some(*id),
        }
    }
}
