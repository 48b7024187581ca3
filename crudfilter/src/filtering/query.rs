//! The composed query: what the translator produces and the record store consumes.

/// How one predicate compares its field. Values stay raw strings; the record store
/// types them using the resource descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Eq(String),
    NotEq(String),
    Gt(String),
    Lt(String),
    Gte(String),
    Lte(String),
    /// SQL `LIKE` pattern, wildcards already applied
    Like(String),
    In(Vec<String>),
    NotIn(Vec<String>),
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: String,
    pub comparison: Comparison,
}

impl Predicate {
    pub fn new(field: impl Into<String>, comparison: Comparison) -> Self {
        Self {
            field: field.into(),
            comparison,
        }
    }
}

/// An ordering clause. The direction is passed through untouched; the record store
/// decides whether it is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub direction: String,
}

/// Accumulated, not yet executed query for one request.
///
/// Predicates are combined with AND. Sort clauses apply in order (the first is the
/// primary key). `includes` are relation paths to eager-load, `counts` relation
/// names whose sizes are attached as `<relation>_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedQuery {
    pub predicates: Vec<Predicate>,
    pub sorts: Vec<SortClause>,
    pub includes: Vec<String>,
    pub counts: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ComposedQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&mut self, field: impl Into<String>, comparison: Comparison) -> &mut Self {
        self.predicates.push(Predicate::new(field, comparison));
        self
    }

    pub fn order_by(&mut self, field: impl Into<String>, direction: impl Into<String>) -> &mut Self {
        self.sorts.push(SortClause {
            field: field.into(),
            direction: direction.into(),
        });
        self
    }

    pub fn with(&mut self, relation: impl Into<String>) -> &mut Self {
        self.includes.push(relation.into());
        self
    }

    pub fn with_count(&mut self, relation: impl Into<String>) -> &mut Self {
        self.counts.push(relation.into());
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }
}
