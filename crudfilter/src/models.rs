use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

/// A row as returned by the record store, keyed by column name. Included relations
/// and `<relation>_count` aggregates are attached as extra keys.
pub type Record = Map<String, Value>;

/// Raw request parameters, in the order they arrived.
///
/// Values are opaque strings; only the translator splits them (on `,` and `:`)
/// and only the record store gives them a type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value supplied for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, replacing any earlier values for the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = false;
                self.0.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge a JSON request body into the parameters. Body values win over query
    /// string values with the same key. Scalars are stringified, `null` becomes the
    /// empty string and nested arrays or objects are kept as JSON text.
    pub fn merge_json(&mut self, body: &Map<String, Value>) {
        for (key, value) in body {
            let value = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other @ (Value::Array(_) | Value::Object(_)) => other.to_string(),
            };
            self.insert(key.clone(), value);
        }
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Entry for populating selection widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectOption {
    #[schema(value_type = Object)]
    pub value: Value,
    #[schema(value_type = Object)]
    pub label: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Reserved list parameters.
///
/// Any other parameter naming a searchable field filters the results, optionally with
/// an operator suffix:
/// `_not`, `_gt`, `_lt`, `_gte`, `_lte`, `_like`, `_in`, `_notIn`, `_isNull`, `_isNotNull`.
///
/// ```text
/// GET /users?status=active&age_gte=18&name_like=ann&sort=name:asc&limit=10
/// GET /users?role_in=admin,editor&deleted_at_isNull=1&contain=posts&count=posts
/// ```
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page size (default 30)
    #[param(example = 30)]
    pub limit: Option<u64>,
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Comma-separated `field:direction` entries, first is the primary key
    #[param(example = "name:asc,age:desc")]
    pub sort: Option<String>,
    /// Comma-separated relations to eager-load; dotted paths load nested relations
    #[param(example = "posts,posts.comments")]
    pub contain: Option<String>,
    /// Comma-separated relations to count
    #[param(example = "posts")]
    pub count: Option<String>,
    /// Alias of `count`, used when `count` is absent
    pub with_count: Option<String>,
}
