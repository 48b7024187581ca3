//! Operations and the storage seam they run against.
//!
//! [`CrudOperations`] turns request parameters into composed queries and writes;
//! a [`RecordStore`] executes them. [`Repository`] wires one resource descriptor to
//! one store.

pub mod crud_operations;
pub mod store;

pub use crud_operations::{CrudOperations, Repository};
pub use store::RecordStore;
