//! Translation of a [`ListQuery`] into parameterised PostgreSQL.
//!
//! Each resource describes its table once as a [`Table`]: the select list,
//! the joined `FROM` clause, the logical-field to SQL-expression map, and
//! the ownership predicate. Logical names that are not in the map are
//! rejected, so user input never reaches the SQL text.

use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use fleetdesk_core::error::{AppError, ErrorKind};
use fleetdesk_core::result::AppResult;
use fleetdesk_core::types::filter::like_pattern;
use fleetdesk_core::types::{
    FilterOp, FilterValue, ListQuery, OwnerScope, PageResponse, SortDirection,
};

/// Static description of a listable table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    /// Table name, used by `UPDATE` and `DELETE`.
    pub name: &'static str,
    /// Alias used in `columns`, `from`, and `fields`.
    pub alias: &'static str,
    /// Select list, including joined display columns.
    pub columns: &'static str,
    /// `FROM` clause with joins.
    pub from: &'static str,
    /// Logical field name to SQL expression.
    pub fields: &'static [(&'static str, &'static str)],
    /// Ownership predicate up to the bound owner id. `None` means the table
    /// has no per-vendor rows.
    pub owner: Option<&'static str>,
}

impl Table {
    /// Resolve a logical field name.
    pub fn column(&self, field: &str) -> AppResult<&'static str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, expr)| *expr)
            .ok_or_else(|| {
                AppError::validation(format!("Unknown field '{field}' for {}", self.name))
            })
    }

    /// `SELECT … WHERE … ORDER BY … LIMIT … OFFSET …` for one page.
    pub fn select_query(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<QueryBuilder<'static, Postgres>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} {}", self.columns, self.from));
        self.push_where(&mut qb, query, scope)?;

        let sort = self.column(&query.sort.field)?;
        let nulls = match query.sort.direction {
            SortDirection::Asc => "NULLS FIRST",
            SortDirection::Desc => "NULLS LAST",
        };
        qb.push(format!(
            " ORDER BY {sort} {dir} {nulls}, {alias}.id {dir}",
            dir = query.sort.direction.as_sql(),
            alias = self.alias,
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.page.limit))
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);
        Ok(qb)
    }

    /// `SELECT COUNT(*) … WHERE …` matching [`Table::select_query`].
    pub fn count_query(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<QueryBuilder<'static, Postgres>> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) {}", self.from));
        self.push_where(&mut qb, query, scope)?;
        Ok(qb)
    }

    /// Single-row select by id within `scope`.
    pub fn by_id_query(&self, id: Uuid, scope: OwnerScope) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} {} WHERE {}.id = ",
            self.columns, self.from, self.alias
        ));
        qb.push_bind(id);
        self.push_scope(&mut qb, scope);
        qb
    }

    /// Append ` AND <owner predicate>` for a restricted scope.
    pub fn push_scope(&self, qb: &mut QueryBuilder<'static, Postgres>, scope: OwnerScope) {
        let Some(owner) = scope.owner() else {
            return;
        };
        match self.owner {
            Some(predicate) => {
                qb.push(" AND ").push(predicate).push_bind(owner);
            }
            None => {
                qb.push(" AND FALSE");
            }
        }
    }

    fn push_where(
        &self,
        qb: &mut QueryBuilder<'static, Postgres>,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<()> {
        qb.push(" WHERE 1=1");
        self.push_scope(qb, scope);

        if let Some(search) = &query.search {
            let pattern = like_pattern(&search.term);
            qb.push(" AND (");
            for (i, field) in search.fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(self.column(field)?)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone());
            }
            qb.push(")");
        }

        for filter in &query.filters {
            let column = self.column(&filter.field)?;
            qb.push(" AND ").push(column);
            match (filter.op, &filter.value) {
                (FilterOp::Eq, FilterValue::Null) => {
                    qb.push(" IS NULL");
                }
                (FilterOp::Ne, FilterValue::Null) => {
                    qb.push(" IS NOT NULL");
                }
                (FilterOp::In, value) => {
                    qb.push(FilterOp::In.as_sql());
                    push_value(qb, value);
                    qb.push(")");
                }
                (op, value) => {
                    qb.push(op.as_sql());
                    push_value(qb, value);
                }
            }
        }
        Ok(())
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value.clone() {
        FilterValue::Null => qb.push_bind(None::<String>),
        FilterValue::Boolean(v) => qb.push_bind(v),
        FilterValue::Integer(v) => qb.push_bind(v),
        FilterValue::Float(v) => qb.push_bind(v),
        FilterValue::Uuid(v) => qb.push_bind(v),
        FilterValue::Timestamp(v) => qb.push_bind(v),
        FilterValue::String(v) => qb.push_bind(v),
        FilterValue::UuidList(v) => qb.push_bind(v),
        FilterValue::StringList(v) => qb.push_bind(v),
    };
}

/// Run the count and page queries for `query`.
pub async fn fetch_page<T>(
    pool: &PgPool,
    table: &Table,
    query: &ListQuery,
    scope: OwnerScope,
) -> AppResult<PageResponse<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count = table.count_query(query, scope)?;
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e| read_error(table, "count", e))?;

    let mut select = table.select_query(query, scope)?;
    let items = select
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(|e| read_error(table, "list", e))?;

    Ok(PageResponse::new(items, total.max(0) as u64, &query.page))
}

/// Fetch one row by id within `scope`.
pub async fn fetch_by_id<T>(
    pool: &PgPool,
    table: &Table,
    id: Uuid,
    scope: OwnerScope,
) -> AppResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    table
        .by_id_query(id, scope)
        .build_query_as::<T>()
        .fetch_optional(pool)
        .await
        .map_err(|e| read_error(table, "find", e))
}

/// Fetch one row that is known to exist, e.g. right after a write.
pub async fn fetch_existing<T>(pool: &PgPool, table: &Table, id: Uuid) -> AppResult<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fetch_by_id(pool, table, id, OwnerScope::All)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} row {id} not found", table.name)))
}

/// Fetch every row matching `query` (ignoring its page) up to `cap` rows.
pub async fn fetch_all<T>(
    pool: &PgPool,
    table: &Table,
    query: &ListQuery,
    scope: OwnerScope,
    cap: u32,
) -> AppResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut query = query.clone();
    query.page = fleetdesk_core::types::PageRequest {
        page: 1,
        limit: cap,
    };
    let mut select = table.select_query(&query, scope)?;
    select
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(|e| read_error(table, "export", e))
}

/// Flip a boolean column and bump `updated_at`. Returns `false` when no row
/// matched within `scope`.
pub async fn toggle(
    pool: &PgPool,
    table: &Table,
    id: Uuid,
    column: &'static str,
    scope: OwnerScope,
) -> AppResult<bool> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "UPDATE {name} {alias} SET {column} = NOT {column}, updated_at = NOW() WHERE {alias}.id = ",
        name = table.name,
        alias = table.alias,
    ));
    qb.push_bind(id);
    table.push_scope(&mut qb, scope);
    let result = qb
        .build()
        .execute(pool)
        .await
        .map_err(|e| read_error(table, "toggle", e))?;
    Ok(result.rows_affected() > 0)
}

/// Delete one row within `scope`. Returns `false` when nothing matched.
pub async fn delete_one(
    pool: &PgPool,
    table: &Table,
    id: Uuid,
    scope: OwnerScope,
) -> AppResult<bool> {
    delete_many(pool, table, &[id], scope).await.map(|n| n > 0)
}

/// Delete the listed rows within `scope`, returning how many went.
pub async fn delete_many(
    pool: &PgPool,
    table: &Table,
    ids: &[Uuid],
    scope: OwnerScope,
) -> AppResult<u64> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "DELETE FROM {name} {alias} WHERE {alias}.id = ANY(",
        name = table.name,
        alias = table.alias,
    ));
    qb.push_bind(ids.to_vec()).push(")");
    table.push_scope(&mut qb, scope);
    let result = qb
        .build()
        .execute(pool)
        .await
        .map_err(|e| delete_error(table, e))?;
    Ok(result.rows_affected())
}

fn read_error(table: &Table, action: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Database,
        format!("Failed to {action} {}", table.name),
        err,
    )
}

/// Map an `INSERT`/`UPDATE` failure. Unique violations become conflicts and
/// broken references become validation errors.
pub fn write_error(table: &Table, err: sqlx::Error) -> AppError {
    let violation = err
        .as_database_error()
        .map(|db| (db.kind(), db.constraint().map(str::to_string)));
    match violation {
        Some((sqlx::error::ErrorKind::UniqueViolation, constraint)) => {
            AppError::conflict(duplicate_message(constraint.as_deref()))
        }
        Some((sqlx::error::ErrorKind::ForeignKeyViolation, _)) => {
            AppError::validation("A referenced record does not exist")
        }
        Some((sqlx::error::ErrorKind::CheckViolation, constraint)) => AppError::validation(
            format!("Value rejected by {}", constraint.unwrap_or_default()),
        ),
        _ => read_error(table, "write", err),
    }
}

/// Map a `DELETE` failure. Rows still referenced elsewhere become integrity
/// errors.
pub fn delete_error(table: &Table, err: sqlx::Error) -> AppError {
    let violation = err.as_database_error().map(|db| db.kind());
    match violation {
        Some(sqlx::error::ErrorKind::ForeignKeyViolation) => AppError::integrity(format!(
            "Cannot delete from {}: the record is still in use",
            table.name
        )),
        _ => read_error(table, "delete", err),
    }
}

/// Conflict messages shared by both backends.
pub mod messages {
    /// Slug taken.
    pub const DUPLICATE_SLUG: &str = "This slug is already in use";
    /// Plate taken.
    pub const DUPLICATE_REGISTRATION: &str = "A vehicle with this registration number already exists";
    /// Currency code taken.
    pub const DUPLICATE_CURRENCY: &str = "A currency with this code already exists";
    /// Tag or category name taken.
    pub const DUPLICATE_NAME: &str = "This name is already in use";
    /// Fallback.
    pub const DUPLICATE: &str = "A record with the same value already exists";
}

fn duplicate_message(constraint: Option<&str>) -> &'static str {
    let constraint = constraint.unwrap_or_default();
    if constraint.contains("slug") {
        messages::DUPLICATE_SLUG
    } else if constraint.contains("registration") {
        messages::DUPLICATE_REGISTRATION
    } else if constraint.starts_with("currencies_code") {
        messages::DUPLICATE_CURRENCY
    } else if constraint.contains("name") {
        messages::DUPLICATE_NAME
    } else {
        messages::DUPLICATE
    }
}
