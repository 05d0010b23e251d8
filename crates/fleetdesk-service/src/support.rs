//! Small helpers shared by the services.

use uuid::Uuid;
use validator::Validate;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::text::slugify;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::OwnerScope;
use fleetdesk_entity::validation;

/// Run the input's `validator` rules, reporting failures per field.
pub(crate) fn validate<T: Validate>(input: &T) -> AppResult<()> {
    input.validate()?;
    Ok(())
}

/// Turn `Option<row>` into the row or a not-found error naming `what`.
pub(crate) fn found<T>(row: Option<T>, what: &str) -> AppResult<T> {
    row.ok_or_else(|| AppError::not_found(format!("{what} not found")))
}

/// Turn the result of a scoped write into the row, or the reason it matched
/// nothing: `Unauthorized` when the row belongs to someone else, not-found
/// when it does not exist at all.
pub(crate) async fn owned<T, R>(
    row: Option<T>,
    repo: &R,
    id: Uuid,
    scope: OwnerScope,
    what: &str,
) -> AppResult<T>
where
    T: Send + Sync + 'static,
    R: ListRepository<T> + ?Sized,
{
    match row {
        Some(row) => Ok(row),
        None => Err(scoped_miss::<T, R>(repo, id, scope, what).await),
    }
}

/// The error for a scoped write on `id` that touched no row.
pub(crate) async fn scoped_miss<T, R>(repo: &R, id: Uuid, scope: OwnerScope, what: &str) -> AppError
where
    T: Send + Sync + 'static,
    R: ListRepository<T> + ?Sized,
{
    if let OwnerScope::Owner(_) = scope {
        match repo.find_by_id(id, OwnerScope::All).await {
            Ok(Some(_)) => return AppError::unauthorized(),
            Ok(None) => {}
            Err(e) => return e,
        }
    }
    AppError::not_found(format!("{what} not found"))
}

/// Slug from the explicit value, else from `fallback`, lowercased and hyphenated.
pub(crate) fn slug_for(field: &str, explicit: Option<&str>, fallback: &str) -> AppResult<String> {
    let source = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback);
    let slug = slugify(source);
    validation::slug(&slug).map_err(|e| {
        let message = e
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Invalid slug".to_string());
        AppError::invalid_field(field, message)
    })?;
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_for() {
        assert_eq!(slug_for("slug", Some("Travel Tips"), "x").unwrap(), "travel-tips");
        assert_eq!(
            slug_for("slug", Some("  "), "Bali Airport Transfers").unwrap(),
            "bali-airport-transfers"
        );
        assert_eq!(slug_for("slug", None, "Ubud -> Kuta").unwrap(), "ubud-kuta");
        assert!(slug_for("slug", None, "!!!").is_err());
        assert_eq!(slug_for("slug", None, "Café Culture").unwrap(), "cafe-culture");
        assert!(slug_for("slug", Some("巴厘岛"), "x").is_err());
    }
}
