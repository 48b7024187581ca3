use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, JsonValue, Value,
    sea_query::{Alias, Asterisk, Expr, Func, Query, SelectStatement, SimpleExpr},
};

use super::eager::{self, IncludeTree};
use crate::core::RecordStore;
use crate::errors::ApiError;
use crate::filtering::conditions::{adapt_value, bind_value, build_condition};
use crate::filtering::ComposedQuery;
use crate::filtering::sort::resolve_order;
use crate::models::Record;
use crate::resource::{Attributes, KeyKind, ResourceDescriptor, ResourceRegistry};

const AGGREGATE: &str = "aggregate";

/// `SELECT` for a composed query: predicates, validated sort clauses and the window.
/// Includes and counts are resolved separately.
pub(crate) fn select_statement(
    resource: &ResourceDescriptor,
    query: &ComposedQuery,
    columns: &[String],
    backend: DatabaseBackend,
) -> Result<SelectStatement, ApiError> {
    let mut select = Query::select();
    select.from(Alias::new(resource.table.as_str()));
    if columns.is_empty() {
        select.column(Asterisk);
    } else {
        select.columns(columns.iter().map(|c| Alias::new(c.as_str())));
    }
    select.cond_where(build_condition(resource, &query.predicates, backend));

    for clause in &query.sorts {
        let (column, order) = resolve_order(resource, clause)?;
        select.order_by(column, order);
    }
    if let Some(limit) = query.limit {
        select.limit(limit);
    }
    if let Some(offset) = query.offset {
        select.offset(offset);
    }
    Ok(select)
}

/// [`RecordStore`] over a SeaORM connection.
///
/// Tables are addressed dynamically through `sea_query`; rows come back as JSON
/// objects. Relation targets are looked up in the registry.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    registry: Arc<ResourceRegistry>,
}

impl SeaOrmStore {
    #[must_use]
    pub fn new(db: DatabaseConnection, registry: Arc<ResourceRegistry>) -> Self {
        let dangling = registry.dangling_relations();
        if !dangling.is_empty() {
            tracing::warn!(
                relations = ?dangling,
                "Relations point at unregistered resources; including them will fail"
            );
        }
        Self { db, registry }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(crate) fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub(crate) fn backend(&self) -> DatabaseBackend {
        self.db.get_database_backend()
    }

    pub(crate) async fn fetch_records(
        &self,
        select: &SelectStatement,
    ) -> Result<Vec<Record>, ApiError> {
        let statement = self.backend().build(select);
        tracing::trace!(sql = %statement, "Fetching records");
        let rows = JsonValue::find_by_statement(statement).all(&self.db).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                JsonValue::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    fn key_condition(&self, resource: &ResourceDescriptor, id: &str) -> SimpleExpr {
        Expr::col(Alias::new(resource.primary_key.as_str())).eq(bind_value(
            resource,
            &resource.primary_key,
            id,
            self.backend(),
        ))
    }

    fn bound_values(&self, attributes: Attributes) -> Vec<(Alias, SimpleExpr)> {
        let backend = self.backend();
        attributes
            .into_iter()
            .map(|(column, value)| {
                (
                    Alias::new(column),
                    SimpleExpr::Value(adapt_value(value, backend)),
                )
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for SeaOrmStore {
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        query: &ComposedQuery,
        columns: &[String],
    ) -> Result<Vec<Record>, ApiError> {
        let tree = IncludeTree::parse(&query.includes);
        eager::check_tree(self, resource, &tree)?;

        let select = select_statement(resource, query, columns, self.backend())?;
        let mut records = self.fetch_records(&select).await?;

        if !records.is_empty() {
            if !tree.is_empty() {
                eager::load_tree(self, resource, &mut records, &tree).await?;
            }
            if !query.counts.is_empty() {
                eager::load_counts(self, resource, &mut records, &query.counts).await?;
            }
        }
        Ok(records)
    }

    async fn count(
        &self,
        resource: &ResourceDescriptor,
        query: &ComposedQuery,
    ) -> Result<u64, ApiError> {
        let backend = self.backend();
        let mut select = Query::select();
        select
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new(AGGREGATE))
            .from(Alias::new(resource.table.as_str()))
            .cond_where(build_condition(resource, &query.predicates, backend));

        let total = match self.db.query_one(backend.build(&select)).await? {
            Some(row) => row.try_get::<i64>("", AGGREGATE)?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn insert(
        &self,
        resource: &ResourceDescriptor,
        mut attributes: Attributes,
    ) -> Result<String, ApiError> {
        let backend = self.backend();
        let pk = resource.primary_key.as_str();

        if let Some(ts) = &resource.timestamps {
            let now = Utc::now();
            for column in [&ts.created_at, &ts.updated_at] {
                if attributes.get(column).is_none() {
                    attributes.set(column.as_str(), Value::from(now));
                }
            }
        }

        let generated = matches!(resource.key_kind, KeyKind::Uuid).then(uuid::Uuid::new_v4);
        if let Some(id) = generated {
            attributes.set(pk, Value::from(id));
        }

        let mut insert = Query::insert();
        insert.into_table(Alias::new(resource.table.as_str()));
        if attributes.is_empty() {
            insert.or_default_values();
        } else {
            let (columns, values): (Vec<Alias>, Vec<SimpleExpr>) =
                self.bound_values(attributes).into_iter().unzip();
            insert.columns(columns);
            insert.values(values).map_err(|err| {
                ApiError::internal("Failed to build insert", Some(err.to_string()))
            })?;
        }

        if let Some(id) = generated {
            self.db.execute(backend.build(&insert)).await?;
            return Ok(id.to_string());
        }

        if backend == DatabaseBackend::Postgres {
            insert.returning_col(Alias::new(pk));
            let row = self
                .db
                .query_one(backend.build(&insert))
                .await?
                .ok_or_else(|| ApiError::internal("Insert returned no row", None))?;
            let id = row
                .try_get::<i64>("", pk)
                .or_else(|_| row.try_get::<i32>("", pk).map(i64::from))?;
            return Ok(id.to_string());
        }

        let result = self.db.execute(backend.build(&insert)).await?;
        Ok(result.last_insert_id().to_string())
    }

    async fn update(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        mut attributes: Attributes,
    ) -> Result<bool, ApiError> {
        if let Some(ts) = &resource.timestamps {
            if attributes.get(&ts.updated_at).is_none() {
                attributes.set(ts.updated_at.as_str(), Value::from(Utc::now()));
            }
        }
        if attributes.is_empty() {
            return Ok(false);
        }

        let mut update = Query::update();
        update
            .table(Alias::new(resource.table.as_str()))
            .values(self.bound_values(attributes))
            .and_where(self.key_condition(resource, id));

        let result = self.db.execute(self.backend().build(&update)).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<bool, ApiError> {
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(resource.table.as_str()))
            .and_where(self.key_condition(resource, id));

        let result = self.db.execute(self.backend().build(&delete)).await?;
        Ok(result.rows_affected() > 0)
    }
}
