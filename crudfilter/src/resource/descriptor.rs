use serde::{Deserialize, Serialize};

use super::relation::Relation;

/// Column types a descriptor can declare. Raw string input is coerced to the
/// matching database value before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Timestamp,
}

/// How primary keys are generated on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Integer key assigned by the database
    #[default]
    AutoIncrement,
    /// UUID v4 generated before insert
    Uuid,
}

impl KeyKind {
    #[must_use]
    pub const fn field_kind(self) -> FieldKind {
        match self {
            Self::AutoIncrement => FieldKind::Integer,
            Self::Uuid => FieldKind::Uuid,
        }
    }
}

/// A writable column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Empty input is written as NULL instead of being coerced
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: String,
    pub updated_at: String,
}

impl Default for Timestamps {
    fn default() -> Self {
        Self {
            created_at: "created_at".to_string(),
            updated_at: "updated_at".to_string(),
        }
    }
}

/// Columns projected by `get_options`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionColumns {
    pub key: String,
    pub label: String,
}

#[allow(clippy::unnecessary_wraps)]
fn default_timestamps() -> Option<Timestamps> {
    Some(Timestamps::default())
}

fn default_primary_key() -> String {
    "id".to_string()
}

/// Everything the translator and the record store need to know about one resource:
/// which columns may be filtered and written, how keys are generated and which
/// relations can be loaded or counted.
///
/// Descriptors are plain data. Build them in code:
///
/// ```rust
/// use crudfilter::resource::{FieldKind, Relation, ResourceDescriptor};
///
/// let users = ResourceDescriptor::new("users", "users")
///     .field("name", FieldKind::Text)
///     .field("age", FieldKind::Integer)
///     .nullable_field("nickname", FieldKind::Text)
///     .relation(Relation::has_many("posts", "posts", "user_id"))
///     .options("id", "name");
///
/// assert!(users.is_searchable("age"));
/// assert!(users.is_searchable("created_at"));
/// ```
///
/// or deserialize them, e.g. from a JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub key_kind: KeyKind,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default = "default_timestamps")]
    pub timestamps: Option<Timestamps>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub options: Option<OptionColumns>,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: default_primary_key(),
            key_kind: KeyKind::default(),
            fields: Vec::new(),
            timestamps: default_timestamps(),
            relations: Vec::new(),
            options: None,
        }
    }

    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>, kind: KeyKind) -> Self {
        self.primary_key = name.into();
        self.key_kind = kind;
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            nullable: false,
        });
        self
    }

    #[must_use]
    pub fn nullable_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            nullable: true,
        });
        self
    }

    #[must_use]
    pub fn timestamps(mut self, created_at: impl Into<String>, updated_at: impl Into<String>) -> Self {
        self.timestamps = Some(Timestamps {
            created_at: created_at.into(),
            updated_at: updated_at.into(),
        });
        self
    }

    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = None;
        self
    }

    #[must_use]
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    #[must_use]
    pub fn options(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.options = Some(OptionColumns {
            key: key.into(),
            label: label.into(),
        });
        self
    }

    /// Writable fields, then the primary key, then the timestamp columns.
    #[must_use]
    pub fn searchable_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        fields.push(&self.primary_key);
        if let Some(ts) = &self.timestamps {
            fields.push(&ts.created_at);
            fields.push(&ts.updated_at);
        }
        fields
    }

    #[must_use]
    pub fn is_searchable(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
            || self.primary_key == name
            || self
                .timestamps
                .as_ref()
                .is_some_and(|ts| ts.created_at == name || ts.updated_at == name)
    }

    /// Searchable fields plus the option label, which need not be writable.
    #[must_use]
    pub fn is_sortable(&self, name: &str) -> bool {
        self.is_searchable(name) || self.option_columns().1 == name
    }

    #[must_use]
    pub fn writable_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn relation_named(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn has_relation(&self, name: &str) -> bool {
        self.relation_named(name).is_some()
    }

    /// Declared kind of any searchable column
    #[must_use]
    pub fn field_kind(&self, column: &str) -> Option<FieldKind> {
        if column == self.primary_key {
            return Some(self.key_kind.field_kind());
        }
        if let Some(field) = self.writable_field(column) {
            return Some(field.kind);
        }
        self.timestamps
            .as_ref()
            .filter(|ts| ts.created_at == column || ts.updated_at == column)
            .map(|_| FieldKind::Timestamp)
    }

    /// `(key, label)` columns for `get_options`; falls back to the primary key and `name`.
    #[must_use]
    pub fn option_columns(&self) -> (&str, &str) {
        self.options
            .as_ref()
            .map_or((self.primary_key.as_str(), "name"), |o| {
                (o.key.as_str(), o.label.as_str())
            })
    }
}
