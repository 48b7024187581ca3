use async_trait::async_trait;

use crate::errors::ApiError;
use crate::filtering::{Comparison, ComposedQuery, Page, PageRequest};
use crate::models::Record;
use crate::resource::{Attributes, ResourceDescriptor};

/// Executes composed queries and writes against some backing storage.
///
/// Implementations type predicate values from the descriptor, validate sort clauses,
/// resolve `includes` and `counts`, and map storage failures onto [`ApiError`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching `query`. An empty `columns` slice selects every column.
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        query: &ComposedQuery,
        columns: &[String],
    ) -> Result<Vec<Record>, ApiError>;

    /// Number of rows matching the predicates of `query`. Sorts, includes and the
    /// window are ignored.
    async fn count(&self, resource: &ResourceDescriptor, query: &ComposedQuery)
    -> Result<u64, ApiError>;

    /// Insert a row and return its primary key as text.
    async fn insert(
        &self,
        resource: &ResourceDescriptor,
        attributes: Attributes,
    ) -> Result<String, ApiError>;

    /// Write `attributes` to the row keyed `id`. Returns whether a row was touched.
    async fn update(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        attributes: Attributes,
    ) -> Result<bool, ApiError>;

    /// Delete the row keyed `id`. Returns whether a row was removed.
    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<bool, ApiError>;

    async fn first(
        &self,
        resource: &ResourceDescriptor,
        query: &ComposedQuery,
    ) -> Result<Option<Record>, ApiError> {
        let mut single = query.clone();
        single.limit(1);
        single.offset = None;
        Ok(self.get(resource, &single, &[]).await?.into_iter().next())
    }

    async fn find(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
    ) -> Result<Option<Record>, ApiError> {
        let mut query = ComposedQuery::new();
        query.filter(resource.primary_key.as_str(), Comparison::Eq(id.to_string()));
        self.first(resource, &query).await
    }

    /// Count the matches, then fetch the requested window of them.
    async fn paginate(
        &self,
        resource: &ResourceDescriptor,
        query: &ComposedQuery,
        page: PageRequest,
    ) -> Result<Page<Record>, ApiError> {
        let total = self.count(resource, query).await?;
        let mut window = query.clone();
        window.limit(page.per_page).offset(page.offset());
        let data = self.get(resource, &window, &[]).await?;
        Ok(Page::new(data, total, page.per_page, page.page))
    }
}
