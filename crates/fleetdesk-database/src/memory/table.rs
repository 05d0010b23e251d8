//! Generic in-memory table and list evaluation.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::types::{
    FilterField, FilterValue, ListQuery, OwnerScope, PageResponse, SortDirection,
};

/// A row that can be stored in a [`MemoryTable`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Primary key.
    fn id(&self) -> Uuid;

    /// Value of a logical field, `None` when the field does not exist.
    fn field(&self, name: &str) -> Option<FilterValue>;

    /// The vendor that owns the row, if any.
    fn owner(&self) -> Option<Uuid> {
        None
    }

    /// Stamp `updated_at` after a write.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Whether the row is visible within `scope`.
    fn visible(&self, scope: OwnerScope) -> bool {
        match scope {
            OwnerScope::All => true,
            OwnerScope::Owner(owner) => self.owner() == Some(owner),
        }
    }
}

/// A concurrent map of rows keyed by id.
#[derive(Debug)]
pub struct MemoryTable<T: Record> {
    rows: DashMap<Uuid, T>,
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    /// Insert or replace a row.
    pub fn insert(&self, row: T) -> T {
        self.rows.insert(row.id(), row.clone());
        row
    }

    /// Find a row within `scope`.
    pub fn get(&self, id: Uuid, scope: OwnerScope) -> Option<T> {
        self.rows
            .get(&id)
            .map(|row| row.value().clone())
            .filter(|row| row.visible(scope))
    }

    /// Snapshot of every row visible within `scope`.
    pub fn visible(&self, scope: OwnerScope) -> Vec<T> {
        self.rows
            .iter()
            .filter(|row| row.visible(scope))
            .map(|row| row.value().clone())
            .collect()
    }

    /// Whether any row satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.rows.iter().any(|row| predicate(row.value()))
    }

    /// Number of rows satisfying `predicate`.
    pub fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.rows.iter().filter(|row| predicate(row.value())).count()
    }

    /// Apply `apply` to one row within `scope`, stamping `updated_at`.
    pub fn update(&self, id: Uuid, scope: OwnerScope, apply: impl FnOnce(&mut T)) -> Option<T> {
        let mut row = self.rows.get_mut(&id)?;
        if !row.visible(scope) {
            return None;
        }
        apply(row.value_mut());
        row.touch(Utc::now());
        Some(row.value().clone())
    }

    /// Apply `apply` to every listed row within `scope`; returns how many
    /// rows changed.
    pub fn update_many(&self, ids: &[Uuid], scope: OwnerScope, apply: impl Fn(&mut T)) -> u64 {
        let now = Utc::now();
        let mut changed = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                if row.visible(scope) {
                    apply(row.value_mut());
                    row.touch(now);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Apply `apply` to every row (used for cross-row invariants such as a
    /// single default currency).
    pub fn update_all(&self, apply: impl Fn(&mut T) -> bool) {
        let now = Utc::now();
        for mut row in self.rows.iter_mut() {
            if apply(row.value_mut()) {
                row.touch(now);
            }
        }
    }

    /// Remove the listed rows within `scope`; returns how many went.
    pub fn remove_many(&self, ids: &[Uuid], scope: OwnerScope) -> u64 {
        ids.iter()
            .filter(|id| self.rows.remove_if(*id, |_, row| row.visible(scope)).is_some())
            .count() as u64
    }
}

/// Filter, sort, and paginate `rows` the way the SQL backend does.
pub fn paginate<T: Record>(rows: Vec<T>, query: &ListQuery) -> AppResult<PageResponse<T>> {
    let mut matched = Vec::with_capacity(rows.len());
    for row in rows {
        if matches(&row, query)? {
            matched.push(row);
        }
    }

    let sort = &query.sort;
    let mut keyed = matched
        .into_iter()
        .map(|row| Ok((value(&row, &sort.field)?, row)))
        .collect::<AppResult<Vec<_>>>()?;
    keyed.sort_by(|(a, ra), (b, rb)| {
        let ord = a
            .compare(b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| ra.id().cmp(&rb.id()));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total = keyed.len() as u64;
    let items = keyed
        .into_iter()
        .map(|(_, row)| row)
        .skip(query.page.offset() as usize)
        .take(query.page.limit as usize)
        .collect();
    Ok(PageResponse::new(items, total, &query.page))
}

/// Filter and sort without paging, capped at `cap` rows.
pub fn collect_all<T: Record>(rows: Vec<T>, query: &ListQuery, cap: u32) -> AppResult<Vec<T>> {
    let mut query = query.clone();
    query.page = fleetdesk_core::types::PageRequest { page: 1, limit: cap };
    paginate(rows, &query).map(|page| page.items)
}

fn matches<T: Record>(row: &T, query: &ListQuery) -> AppResult<bool> {
    if let Some(search) = &query.search {
        let mut hit = false;
        for field in &search.fields {
            if FilterField::contains(*field, &search.term).matches(&value(row, field)?) {
                hit = true;
                break;
            }
        }
        if !hit {
            return Ok(false);
        }
    }
    for filter in &query.filters {
        if !filter.matches(&value(row, &filter.field)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn value<T: Record>(row: &T, field: &str) -> AppResult<FilterValue> {
    row.field(field)
        .ok_or_else(|| AppError::validation(format!("Unknown field '{field}'")))
}
