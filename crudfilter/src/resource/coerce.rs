use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::Value;

use super::descriptor::{FieldKind, ResourceDescriptor};
use crate::errors::ApiError;
use crate::models::QueryParams;

impl FieldKind {
    /// Coerce a raw request string into a database value of this kind.
    ///
    /// # Errors
    ///
    /// Returns a short description of the expected format when `raw` does not parse.
    pub fn coerce(self, raw: &str) -> Result<Value, &'static str> {
        match self {
            Self::Text => Ok(Value::from(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "an integer"),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| "a number"),
            Self::Boolean => parse_bool(raw).map(Value::from).ok_or("a boolean"),
            Self::Uuid => uuid::Uuid::parse_str(raw.trim())
                .map(Value::from)
                .map_err(|_| "a UUID"),
            Self::Timestamp => parse_timestamp(raw)
                .map(Value::from)
                .ok_or("an RFC 3339 timestamp or YYYY-MM-DD date"),
        }
    }

    /// Typed NULL for this kind
    #[must_use]
    pub fn null(self) -> Value {
        match self {
            Self::Text => Option::<String>::None.into(),
            Self::Integer => Option::<i64>::None.into(),
            Self::Float => Option::<f64>::None.into(),
            Self::Boolean => Option::<bool>::None.into(),
            Self::Uuid => Option::<uuid::Uuid>::None.into(),
            Self::Timestamp => Option::<DateTime<Utc>>::None.into(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Typed column writes, produced only from a descriptor's writable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, Value)>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an earlier write to the same column.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl ResourceDescriptor {
    /// Turn request parameters into column writes.
    ///
    /// Only declared writable fields are kept; every other key (including reserved
    /// ones such as `contain`) is dropped. An empty value on a nullable field writes
    /// NULL.
    ///
    /// # Errors
    ///
    /// `ApiError::ValidationFailed` listing every value that did not coerce.
    pub fn fill_attributes(&self, params: &QueryParams) -> Result<Attributes, ApiError> {
        let mut attributes = Attributes::new();
        let mut errors = Vec::new();

        for (key, raw) in params.iter() {
            let Some(field) = self.writable_field(key) else {
                tracing::debug!(resource = %self.name, key, "Dropping non-writable attribute");
                continue;
            };

            if field.nullable && raw.is_empty() {
                attributes.set(key, field.kind.null());
                continue;
            }

            match field.kind.coerce(raw) {
                Ok(value) => attributes.set(key, value),
                Err(expected) => errors.push(format!("{key}: expected {expected}")),
            }
        }

        if errors.is_empty() {
            Ok(attributes)
        } else {
            Err(ApiError::validation_failed(errors))
        }
    }
}
