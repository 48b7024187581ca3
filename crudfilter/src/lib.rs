//! # crudfilter
//!
//! Query-parameter filtering and CRUD operations for resources described at runtime.
//!
//! A [`ResourceDescriptor`] declares a table, its writable fields, timestamp columns
//! and relations. [`QueryFilterTranslator`] turns request parameters such as
//! `status=active&age_gte=18&sort=name:asc` into a [`ComposedQuery`], and a
//! [`RecordStore`] executes it. [`SeaOrmStore`] is the shipped store and
//! [`resource_router`] exposes the operations over axum with OpenAPI documentation.
//!
//! ```rust,ignore
//! let mut registry = ResourceRegistry::new();
//! let users = registry.register(
//!     ResourceDescriptor::new("users", "users")
//!         .field("name", FieldKind::Text)
//!         .field("age", FieldKind::Integer)
//!         .relation(Relation::has_many("posts", "posts", "user_id")),
//! );
//! registry.register(ResourceDescriptor::new("posts", "posts").field("user_id", FieldKind::Integer));
//!
//! let store = Arc::new(SeaOrmStore::new(db, Arc::new(registry)));
//! let app = OpenApiRouter::new().nest("/users", resource_router(Arc::new(Repository::new(users, store))));
//! ```

pub mod core;
pub mod database;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod resource;
pub mod routes;

pub use crate::core::{CrudOperations, RecordStore, Repository};
pub use database::SeaOrmStore;
pub use errors::ApiError;
pub use filtering::{ComposedQuery, Page, QueryFilterTranslator, QuerySettings};
pub use models::{QueryParams, Record, SelectOption};
pub use resource::{FieldKind, KeyKind, Relation, ResourceDescriptor, ResourceRegistry};
pub use routes::resource_router;
