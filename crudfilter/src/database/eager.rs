//! Relation loading for fetched rows.
//!
//! Every relation level costs one `IN` query over the keys of the rows above it, and
//! every counted relation one grouped `COUNT(*)`. Related rows are matched back to
//! their parents by the textual form of the join key.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, Query};
use serde_json::Value;

use super::sea_orm_store::{SeaOrmStore, select_statement};
use crate::errors::ApiError;
use crate::filtering::conditions::build_condition;
use crate::filtering::{Comparison, ComposedQuery, Predicate};
use crate::models::Record;
use crate::resource::{Relation, ResourceDescriptor};

const AGGREGATE: &str = "aggregate";

/// Include paths folded by shared prefix: `author` and `author.posts` load `author`
/// once, then `posts` beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree(Vec<(String, IncludeTree)>);

impl IncludeTree {
    pub fn parse<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut tree = Self::default();
        for path in paths {
            let mut node = &mut tree;
            for segment in path.as_ref().split('.').map(str::trim).filter(|s| !s.is_empty()) {
                node = node.child(segment);
            }
        }
        tree
    }

    fn child(&mut self, name: &str) -> &mut Self {
        let index = if let Some(index) = self.0.iter().position(|(n, _)| n == name) {
            index
        } else {
            self.0.push((name.to_string(), Self::default()));
            self.0.len() - 1
        };
        &mut self.0[index].1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.0.iter().map(|(name, children)| (name.as_str(), children))
    }
}

/// Text form of a join key; `None` for null or structured values.
fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn distinct_keys(records: &[Record], column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| record.get(column).and_then(key_string))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

fn resolve<'r>(
    store: &SeaOrmStore,
    parent: &'r ResourceDescriptor,
    name: &str,
) -> Result<(&'r Relation, std::sync::Arc<ResourceDescriptor>), ApiError> {
    let relation = parent.relation_named(name).ok_or_else(|| {
        ApiError::bad_request(format!("Unknown relation '{name}' on {}", parent.name))
    })?;
    let target = store.registry().get(&relation.target).ok_or_else(|| {
        ApiError::internal(
            format!("Relation {}.{} cannot be loaded", parent.name, relation.name),
            Some(format!("resource '{}' is not registered", relation.target)),
        )
    })?;
    Ok((relation, target))
}

/// Resolve every path in `tree` against the registry before anything is loaded.
///
/// # Errors
///
/// `ApiError::BadRequest` when a path names a relation the resource does not declare.
pub(crate) fn check_tree(
    store: &SeaOrmStore,
    parent: &ResourceDescriptor,
    tree: &IncludeTree,
) -> Result<(), ApiError> {
    for (name, children) in tree.iter() {
        let (_, target) = resolve(store, parent, name)?;
        check_tree(store, &target, children)?;
    }
    Ok(())
}

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + 'a>>;

/// Attach every relation in `tree` to `records`, recursing into nested paths.
pub(crate) fn load_tree<'a>(
    store: &'a SeaOrmStore,
    parent: &'a ResourceDescriptor,
    records: &'a mut [Record],
    tree: &'a IncludeTree,
) -> LoadFuture<'a> {
    Box::pin(async move {
        for (name, children) in tree.iter() {
            let (relation, target) = resolve(store, parent, name)?;
            let (parent_col, target_col) = relation.join_columns(parent, &target);

            let keys = distinct_keys(records, parent_col);
            let mut related = if keys.is_empty() {
                Vec::new()
            } else {
                let mut query = ComposedQuery::new();
                query
                    .filter(target_col, Comparison::In(keys))
                    .order_by(target.primary_key.as_str(), "asc");
                let select = select_statement(&target, &query, &[], store.backend())?;
                store.fetch_records(&select).await?
            };

            if !children.is_empty() && !related.is_empty() {
                load_tree(store, &target, &mut related, children).await?;
            }

            let mut grouped: HashMap<String, Vec<Record>> = HashMap::new();
            for row in related {
                if let Some(key) = row.get(target_col).and_then(key_string) {
                    grouped.entry(key).or_default().push(row);
                }
            }

            for record in records.iter_mut() {
                let rows = record
                    .get(parent_col)
                    .and_then(key_string)
                    .and_then(|key| grouped.get(&key))
                    .cloned()
                    .unwrap_or_default();
                let value = if relation.is_plural() {
                    Value::Array(rows.into_iter().map(Value::Object).collect())
                } else {
                    rows.into_iter().next().map_or(Value::Null, Value::Object)
                };
                record.insert(relation.name.clone(), value);
            }
            tracing::trace!(resource = %parent.name, relation = %relation.name, "Loaded relation");
        }
        Ok(())
    })
}

/// Attach `<relation>_count` to every record, 0 when nothing is related.
pub(crate) async fn load_counts(
    store: &SeaOrmStore,
    parent: &ResourceDescriptor,
    records: &mut [Record],
    relations: &[String],
) -> Result<(), ApiError> {
    for name in relations {
        let (relation, target) = resolve(store, parent, name)?;
        let (parent_col, target_col) = relation.join_columns(parent, &target);

        let keys = distinct_keys(records, parent_col);
        let mut counts: HashMap<String, u64> = HashMap::new();
        if !keys.is_empty() {
            let predicate = Predicate::new(target_col, Comparison::In(keys));
            let mut select = Query::select();
            select
                .column(Alias::new(target_col))
                .expr_as(Func::count(Expr::col(Asterisk)), Alias::new(AGGREGATE))
                .from(Alias::new(target.table.as_str()))
                .cond_where(build_condition(&target, &[predicate], store.backend()))
                .group_by_col(Alias::new(target_col));

            for row in store.fetch_records(&select).await? {
                let key = row.get(target_col).and_then(key_string);
                let total = row.get(AGGREGATE).and_then(Value::as_u64);
                if let (Some(key), Some(total)) = (key, total) {
                    counts.insert(key, total);
                }
            }
        }

        let field = format!("{}_count", relation.name);
        for record in records.iter_mut() {
            let total = record
                .get(parent_col)
                .and_then(key_string)
                .and_then(|key| counts.get(&key).copied())
                .unwrap_or(0);
            record.insert(field.clone(), Value::from(total));
        }
    }
    Ok(())
}
