use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::store::RecordStore;
use crate::errors::ApiError;
use crate::filtering::{Comparison, ComposedQuery, Page, PageRequest, QueryFilterTranslator, QuerySettings};
use crate::models::{QueryParams, Record, SelectOption};
use crate::resource::ResourceDescriptor;

/// CRUD operations for one resource, driven by raw request parameters.
///
/// Only the three accessors are required; every operation has a default body that
/// implementors may override one at a time.
///
/// ```rust,ignore
/// let users = Repository::new(registry.get("users").unwrap(), store.clone());
/// let page = users.get_all(&QueryParams::from_iter([("age_gte", "18"), ("sort", "name:asc")])).await?;
/// ```
#[async_trait]
pub trait CrudOperations: Send + Sync {
    fn resource(&self) -> &ResourceDescriptor;

    fn record_store(&self) -> &dyn RecordStore;

    fn settings(&self) -> &QuerySettings;

    fn translator(&self) -> QueryFilterTranslator<'_> {
        QueryFilterTranslator::new(self.resource())
    }

    /// Filter, include, count, sort and paginate with `limit` / `page`.
    async fn get_all(&self, params: &QueryParams) -> Result<Page<Record>, ApiError> {
        let query = self.translator().search_builder(params);
        let page = PageRequest::from_params(params, self.settings());
        self.record_store()
            .paginate(self.resource(), &query, page)
            .await
    }

    async fn search(&self, params: &QueryParams) -> Result<Page<Record>, ApiError> {
        self.get_all(params).await
    }

    async fn count(&self, params: &QueryParams) -> Result<u64, ApiError> {
        let mut query = ComposedQuery::new();
        self.translator().build_search_params(params, &mut query);
        self.record_store().count(self.resource(), &query).await
    }

    /// `None` when no row has this key; filter parameters are not applied.
    async fn get_by_id(&self, id: &str, params: &QueryParams) -> Result<Option<Record>, ApiError> {
        let resource = self.resource();
        let translator = self.translator();

        let mut query = ComposedQuery::new();
        query.filter(resource.primary_key.as_str(), Comparison::Eq(id.to_string()));
        translator.include_counts(params, &mut query);
        translator.include_contains(params, &mut query);
        translator.apply_sorts(params, &mut query);

        self.record_store().first(resource, &query).await
    }

    async fn store(&self, params: &QueryParams) -> Result<Record, ApiError> {
        let attributes = self.resource().fill_attributes(params)?;
        let id = self
            .record_store()
            .insert(self.resource(), attributes)
            .await?;
        tracing::debug!(resource = %self.resource().name, id = %id, "Created record");
        self.refetch(&id, params).await
    }

    /// # Errors
    ///
    /// `ApiError::NotFound` when no row has this key.
    async fn modify(&self, params: &QueryParams, id: &str) -> Result<Record, ApiError> {
        let resource = self.resource();
        if self.record_store().find(resource, id).await?.is_none() {
            return Err(ApiError::not_found(&resource.name, Some(id.to_string())));
        }

        let attributes = resource.fill_attributes(params)?;
        if attributes.is_empty() {
            tracing::debug!(resource = %resource.name, id, "Nothing to update");
        } else {
            self.record_store().update(resource, id, attributes).await?;
        }
        self.refetch(id, params).await
    }

    /// `Ok(false)` when no row has this key.
    async fn remove(&self, id: &str) -> Result<bool, ApiError> {
        let resource = self.resource();
        if self.record_store().find(resource, id).await?.is_none() {
            return Ok(false);
        }
        self.record_store()
            .delete(resource, id)
            .await
            .inspect_err(|err| {
                tracing::warn!(resource = %resource.name, id, error = %err, "Failed to delete record");
            })
    }

    /// Key/label pairs for selection widgets, ordered by label. Rows with a falsy
    /// label are left out.
    async fn get_options(&self) -> Result<Vec<SelectOption>, ApiError> {
        let resource = self.resource();
        let (key, label) = resource.option_columns();

        let mut query = ComposedQuery::new();
        query.order_by(label, "asc");
        let columns = [key.to_string(), label.to_string()];
        let rows = self.record_store().get(resource, &query, &columns).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let text = row.get(label).cloned().unwrap_or(Value::Null);
                if is_falsy(&text) {
                    return None;
                }
                Some(SelectOption {
                    value: row.get(key).cloned().unwrap_or(Value::Null),
                    label: text,
                })
            })
            .collect())
    }

    /// Load a just-written row with the relations and counts requested in `params`.
    async fn refetch(&self, id: &str, params: &QueryParams) -> Result<Record, ApiError> {
        let resource = self.resource();
        let translator = self.translator();

        let mut query = ComposedQuery::new();
        query.filter(resource.primary_key.as_str(), Comparison::Eq(id.to_string()));
        translator.include_contains(params, &mut query);
        translator.include_counts(params, &mut query);

        self.record_store()
            .first(resource, &query)
            .await?
            .ok_or_else(|| ApiError::not_found(&resource.name, Some(id.to_string())))
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// The stock [`CrudOperations`] implementation: a descriptor, a store and settings.
#[derive(Clone)]
pub struct Repository {
    resource: Arc<ResourceDescriptor>,
    store: Arc<dyn RecordStore>,
    settings: QuerySettings,
}

impl Repository {
    pub fn new(resource: Arc<ResourceDescriptor>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            resource,
            store,
            settings: QuerySettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuerySettings) -> Self {
        self.settings = settings;
        self
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("resource", &self.resource.name)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CrudOperations for Repository {
    fn resource(&self) -> &ResourceDescriptor {
        &self.resource
    }

    fn record_store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    fn settings(&self) -> &QuerySettings {
        &self.settings
    }
}
