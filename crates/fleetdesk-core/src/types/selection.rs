//! Bulk selection.
//!
//! [`BulkIds`] is the validated id list every bulk mutation accepts.
//! [`BulkSelection`] models the selection bar of a table view as an explicit
//! state machine: ids are picked, an action is confirmed, then submitted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Maximum number of rows a single bulk statement may touch.
pub const MAX_BULK_IDS: usize = 500;

/// A non-empty, de-duplicated list of row ids for a bulk statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkIds(Vec<Uuid>);

impl BulkIds {
    /// Validate and de-duplicate the ids, preserving first-seen order.
    pub fn new(ids: impl IntoIterator<Item = Uuid>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        let ids: Vec<Uuid> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

        if ids.is_empty() {
            return Err(AppError::invalid_field("ids", "Select at least one item"));
        }
        if ids.len() > MAX_BULK_IDS {
            return Err(AppError::invalid_field(
                "ids",
                format!("At most {MAX_BULK_IDS} items can be changed at once"),
            ));
        }
        Ok(Self(ids))
    }

    /// The ids as a slice.
    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for BulkIds {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<Uuid>::deserialize(deserializer)?;
        Self::new(ids).map_err(|e| serde::de::Error::custom(e.message))
    }
}

/// Selection-bar state for a table with bulk actions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BulkSelection<A> {
    /// Nothing selected; the bar is hidden.
    #[default]
    Idle,
    /// One or more rows selected.
    Selecting(BTreeSet<Uuid>),
    /// An action was chosen and awaits confirmation.
    Confirming {
        /// The chosen action.
        action: A,
        /// The rows it applies to.
        ids: BTreeSet<Uuid>,
    },
    /// The action is in flight.
    Submitting {
        /// The submitted action.
        action: A,
        /// The rows it applies to.
        ids: BTreeSet<Uuid>,
    },
}

impl<A: Clone> BulkSelection<A> {
    /// Selected ids in any state.
    pub fn selected(&self) -> Option<&BTreeSet<Uuid>> {
        match self {
            Self::Idle => None,
            Self::Selecting(ids)
            | Self::Confirming { ids, .. }
            | Self::Submitting { ids, .. } => Some(ids),
        }
    }

    /// Toggle one row. Deselecting the last row returns to `Idle`.
    pub fn toggle(self, id: Uuid) -> AppResult<Self> {
        let mut ids = match self {
            Self::Idle => BTreeSet::new(),
            Self::Selecting(ids) => ids,
            other => return Err(invalid_transition(&other, "toggle")),
        };
        if !ids.remove(&id) {
            ids.insert(id);
        }
        Ok(Self::from_ids(ids))
    }

    /// Select every row on the current page.
    pub fn select_all(self, page_ids: impl IntoIterator<Item = Uuid>) -> AppResult<Self> {
        match self {
            Self::Idle | Self::Selecting(_) => Ok(Self::from_ids(page_ids.into_iter().collect())),
            other => Err(invalid_transition(&other, "select all")),
        }
    }

    /// Drop the selection.
    pub fn clear(self) -> AppResult<Self> {
        match self {
            Self::Submitting { .. } => Err(invalid_transition(&self, "clear")),
            _ => Ok(Self::Idle),
        }
    }

    /// Choose an action for the selected rows and ask for confirmation.
    pub fn request(self, action: A) -> AppResult<Self> {
        match self {
            Self::Selecting(ids) => Ok(Self::Confirming { action, ids }),
            other => Err(invalid_transition(&other, "request")),
        }
    }

    /// Dismiss the confirmation dialog, keeping the selection.
    pub fn cancel(self) -> AppResult<Self> {
        match self {
            Self::Confirming { ids, .. } => Ok(Self::Selecting(ids)),
            other => Err(invalid_transition(&other, "cancel")),
        }
    }

    /// Confirm the action. Returns the new state and the ids to send.
    pub fn submit(self) -> AppResult<(Self, A, BulkIds)> {
        match self {
            Self::Confirming { action, ids } => {
                let bulk = BulkIds::new(ids.iter().copied())?;
                Ok((
                    Self::Submitting {
                        action: action.clone(),
                        ids,
                    },
                    action,
                    bulk,
                ))
            }
            other => Err(invalid_transition(&other, "submit")),
        }
    }

    /// Record the outcome. Success clears the selection; failure keeps it so
    /// the user can retry.
    pub fn finish(self, succeeded: bool) -> AppResult<Self> {
        match self {
            Self::Submitting { .. } if succeeded => Ok(Self::Idle),
            Self::Submitting { ids, .. } => Ok(Self::Selecting(ids)),
            other => Err(invalid_transition(&other, "finish")),
        }
    }

    fn from_ids(ids: BTreeSet<Uuid>) -> Self {
        if ids.is_empty() {
            Self::Idle
        } else {
            Self::Selecting(ids)
        }
    }

    fn state_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting(_) => "selecting",
            Self::Confirming { .. } => "confirming",
            Self::Submitting { .. } => "submitting",
        }
    }
}

fn invalid_transition<A: Clone>(state: &BulkSelection<A>, event: &str) -> AppError {
    AppError::validation(format!(
        "Cannot {event} while the selection is {}",
        state.state_name()
    ))
}
