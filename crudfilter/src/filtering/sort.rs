use sea_orm::{Order, sea_query::Alias};

use super::query::SortClause;
use crate::errors::ApiError;
use crate::resource::ResourceDescriptor;

/// Parse a `sort` value: comma-separated `field:direction` entries.
///
/// Entries that do not split into exactly two parts on `:` are dropped. Both parts
/// are trimmed; the direction is not checked here.
#[must_use]
pub fn parse_sort_param(raw: &str) -> Vec<SortClause> {
    raw.split(',')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split(':').collect();
            match parts.as_slice() {
                [field, direction] => Some(SortClause {
                    field: field.trim().to_string(),
                    direction: direction.trim().to_string(),
                }),
                _ => {
                    tracing::trace!(entry, "Ignoring malformed sort entry");
                    None
                }
            }
        })
        .collect()
}

/// Convert sort direction string to `Order`, case-insensitively
fn parse_order(direction: &str) -> Option<Order> {
    match direction.to_ascii_lowercase().as_str() {
        "asc" => Some(Order::Asc),
        "desc" => Some(Order::Desc),
        _ => None,
    }
}

/// Validate a sort clause against the resource and turn it into a column and order.
///
/// # Errors
///
/// `ApiError::BadRequest` when the column is not sortable or the direction is not
/// `asc`/`desc`.
pub fn resolve_order(
    resource: &ResourceDescriptor,
    clause: &SortClause,
) -> Result<(Alias, Order), ApiError> {
    if !resource.is_sortable(&clause.field) {
        return Err(ApiError::bad_request(format!(
            "Cannot sort {} by unknown field '{}'",
            resource.name, clause.field
        )));
    }
    let order = parse_order(&clause.direction).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Sort direction must be \"asc\" or \"desc\", got '{}'",
            clause.direction
        ))
    })?;
    Ok((Alias::new(clause.field.as_str()), order))
}
