use serde::{Deserialize, Serialize};

use super::descriptor::ResourceDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Target rows carry `foreign_key` pointing at the parent; loads as an array
    HasMany,
    /// Like `HasMany` but loads the first match as an object (or `null`)
    HasOne,
    /// The parent row carries `foreign_key` pointing at the target; loads as an object (or `null`)
    BelongsTo,
}

/// A named relation from one resource to another.
///
/// `owner_key` is the column the foreign key points at: on the parent for
/// `HasMany`/`HasOne`, on the target for `BelongsTo`. It defaults to that side's
/// primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub kind: RelationKind,
    /// Registered name of the related resource
    pub target: String,
    pub foreign_key: String,
    #[serde(default)]
    pub owner_key: Option<String>,
}

impl Relation {
    fn build(
        kind: RelationKind,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            foreign_key: foreign_key.into(),
            owner_key: None,
        }
    }

    pub fn has_many(
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::build(RelationKind::HasMany, name, target, foreign_key)
    }

    pub fn has_one(
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::build(RelationKind::HasOne, name, target, foreign_key)
    }

    pub fn belongs_to(
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::build(RelationKind::BelongsTo, name, target, foreign_key)
    }

    #[must_use]
    pub fn owner_key(mut self, column: impl Into<String>) -> Self {
        self.owner_key = Some(column.into());
        self
    }

    /// `(parent column, target column)` whose values must be equal for a parent row
    /// and a target row to be related.
    #[must_use]
    pub fn join_columns<'a>(
        &'a self,
        parent: &'a ResourceDescriptor,
        target: &'a ResourceDescriptor,
    ) -> (&'a str, &'a str) {
        match self.kind {
            RelationKind::HasMany | RelationKind::HasOne => (
                self.owner_key.as_deref().unwrap_or(&parent.primary_key),
                &self.foreign_key,
            ),
            RelationKind::BelongsTo => (
                &self.foreign_key,
                self.owner_key.as_deref().unwrap_or(&target.primary_key),
            ),
        }
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self.kind, RelationKind::HasMany)
    }
}
