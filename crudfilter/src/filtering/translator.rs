use super::operators;
use super::query::{Comparison, ComposedQuery};
use super::sort::parse_sort_param;
use crate::models::QueryParams;
use crate::resource::ResourceDescriptor;

pub const CONTAIN_PARAM: &str = "contain";
pub const COUNT_PARAM: &str = "count";
pub const WITH_COUNT_PARAM: &str = "with_count";
pub const SORT_PARAM: &str = "sort";

/// Turns raw request parameters into a [`ComposedQuery`] for one resource.
///
/// Nothing here fails: parameters that do not name a searchable field, relations
/// the resource does not declare and malformed sort entries are dropped.
#[derive(Debug, Clone, Copy)]
pub struct QueryFilterTranslator<'a> {
    resource: &'a ResourceDescriptor,
}

impl<'a> QueryFilterTranslator<'a> {
    #[must_use]
    pub const fn new(resource: &'a ResourceDescriptor) -> Self {
        Self { resource }
    }

    #[must_use]
    pub fn searchable_fields(&self) -> Vec<&'a str> {
        self.resource.searchable_fields()
    }

    /// Add a predicate for every parameter naming a searchable field, either exactly
    /// (equality) or with an operator suffix. A key may match both ways; each match
    /// appends its own predicate.
    pub fn build_search_params(&self, params: &QueryParams, query: &mut ComposedQuery) {
        for (key, value) in params.iter() {
            let mut matched = false;

            if self.resource.is_searchable(key) {
                query.filter(key, Comparison::Eq(value.to_string()));
                matched = true;
            }

            for (field, operator) in operators::matching(key) {
                if self.resource.is_searchable(field) {
                    query.filter(field, (operator.build)(value));
                    matched = true;
                }
            }

            if !matched {
                tracing::trace!(resource = %self.resource.name, key, "Ignoring parameter");
            }
        }
    }

    /// Eager-load the relations listed in `contain`. Dotted entries are nested paths
    /// and are passed on for the record store to resolve.
    pub fn include_contains(&self, params: &QueryParams, query: &mut ComposedQuery) {
        let Some(raw) = params.get(CONTAIN_PARAM) else {
            return;
        };

        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if self.resource.has_relation(name) || name.contains('.') {
                query.with(name);
            } else {
                tracing::trace!(resource = %self.resource.name, relation = name, "Ignoring unknown relation");
            }
        }
    }

    /// Count the relations listed in `count`, or in `with_count` when `count` is absent.
    pub fn include_counts(&self, params: &QueryParams, query: &mut ComposedQuery) {
        let Some(raw) = params
            .get(COUNT_PARAM)
            .or_else(|| params.get(WITH_COUNT_PARAM))
        else {
            return;
        };

        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if self.resource.has_relation(name) {
                query.with_count(name);
            } else {
                tracing::trace!(resource = %self.resource.name, relation = name, "Ignoring unknown count");
            }
        }
    }

    pub fn apply_sorts(&self, params: &QueryParams, query: &mut ComposedQuery) {
        if let Some(raw) = params.get(SORT_PARAM) {
            for clause in parse_sort_param(raw) {
                query.order_by(clause.field, clause.direction);
            }
        }
    }

    /// Predicates, then includes, then counts, then sorts.
    #[must_use]
    pub fn search_builder(&self, params: &QueryParams) -> ComposedQuery {
        let mut query = ComposedQuery::new();
        self.build_search_params(params, &mut query);
        self.include_contains(params, &mut query);
        self.include_counts(params, &mut query);
        self.apply_sorts(params, &mut query);
        tracing::debug!(resource = %self.resource.name, ?query, "Composed query");
        query
    }
}
