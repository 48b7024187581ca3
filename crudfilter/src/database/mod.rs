//! SeaORM-backed [`RecordStore`](crate::core::RecordStore).

pub mod eager;
pub mod sea_orm_store;

pub use eager::IncludeTree;
pub use sea_orm_store::SeaOrmStore;
