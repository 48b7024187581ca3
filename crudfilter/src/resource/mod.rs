//! # Resource Descriptors
//!
//! A resource is described by data rather than by convention: its table, key,
//! writable fields, timestamp columns, relations and option columns. The translator
//! reads the descriptor to decide which parameters become predicates, and the record
//! store reads it to type values and resolve relations.

pub mod coerce;
pub mod descriptor;
pub mod registry;
pub mod relation;

pub use coerce::Attributes;
pub use descriptor::{FieldDef, FieldKind, KeyKind, OptionColumns, ResourceDescriptor, Timestamps};
pub use registry::ResourceRegistry;
pub use relation::{Relation, RelationKind};
