use sea_orm::{
    Condition, DatabaseBackend, Value,
    sea_query::{Alias, Expr, SimpleExpr},
};

use super::query::{Comparison, Predicate};
use crate::resource::ResourceDescriptor;

/// UUIDs are bound natively on `PostgreSQL` and as hyphenated text elsewhere.
#[must_use]
pub fn adapt_value(value: Value, backend: DatabaseBackend) -> Value {
    if backend == DatabaseBackend::Postgres {
        return value;
    }
    match value {
        Value::Uuid(Some(uuid)) => Value::from(uuid.to_string()),
        Value::Uuid(None) => Option::<String>::None.into(),
        other => other,
    }
}

/// Type a raw value with the column's declared kind. Values that do not coerce are
/// bound as text and left for the database to compare.
#[must_use]
pub fn bind_value(
    resource: &ResourceDescriptor,
    column: &str,
    raw: &str,
    backend: DatabaseBackend,
) -> Value {
    let kind = resource.field_kind(column).unwrap_or_default();
    match kind.coerce(raw) {
        Ok(value) => adapt_value(value, backend),
        Err(expected) => {
            tracing::trace!(column, raw, expected, "Binding uncoercible filter value as text");
            Value::from(raw.to_string())
        }
    }
}

fn predicate_expr(
    resource: &ResourceDescriptor,
    predicate: &Predicate,
    backend: DatabaseBackend,
) -> SimpleExpr {
    let field = predicate.field.as_str();
    let column = Expr::col(Alias::new(field));
    let bind = |raw: &str| bind_value(resource, field, raw, backend);
    let bind_all = |values: &[String]| values.iter().map(|v| bind(v)).collect::<Vec<Value>>();

    match &predicate.comparison {
        Comparison::Eq(raw) => column.eq(bind(raw)),
        Comparison::NotEq(raw) => column.ne(bind(raw)),
        Comparison::Gt(raw) => column.gt(bind(raw)),
        Comparison::Lt(raw) => column.lt(bind(raw)),
        Comparison::Gte(raw) => column.gte(bind(raw)),
        Comparison::Lte(raw) => column.lte(bind(raw)),
        Comparison::Like(pattern) => column.like(pattern.as_str()),
        Comparison::In(values) => column.is_in(bind_all(values)),
        Comparison::NotIn(values) => column.is_not_in(bind_all(values)),
        Comparison::IsNull => column.is_null(),
        Comparison::IsNotNull => column.is_not_null(),
    }
}

/// AND together every predicate of a composed query.
#[must_use]
pub fn build_condition(
    resource: &ResourceDescriptor,
    predicates: &[Predicate],
    backend: DatabaseBackend,
) -> Condition {
    predicates
        .iter()
        .fold(Condition::all(), |condition, predicate| {
            condition.add(predicate_expr(resource, predicate, backend))
        })
}
