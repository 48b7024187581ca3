#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use crudfilter::{
    CrudOperations, FieldKind, KeyKind, QueryParams, Record, Relation, Repository,
    ResourceDescriptor, ResourceRegistry, SeaOrmStore, resource_router,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub db: DatabaseConnection,
    pub registry: Arc<ResourceRegistry>,
    pub store: Arc<SeaOrmStore>,
}

impl TestApp {
    pub fn repository(&self, name: &str) -> Repository {
        let resource = self
            .registry
            .get(name)
            .unwrap_or_else(|| panic!("resource {name} is not registered"));
        Repository::new(resource, self.store.clone())
    }

    pub fn router(&self) -> Router {
        let (router, _api) = utoipa_axum::router::OpenApiRouter::new()
            .nest("/users", resource_router(Arc::new(self.repository("users"))))
            .nest("/posts", resource_router(Arc::new(self.repository("posts"))))
            .nest("/comments", resource_router(Arc::new(self.repository("comments"))))
            .split_for_parts();
        router
    }
}

pub fn registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry.register(
        ResourceDescriptor::new("users", "users")
            .field("name", FieldKind::Text)
            .field("email", FieldKind::Text)
            .field("age", FieldKind::Integer)
            .field("status", FieldKind::Text)
            .nullable_field("deleted_at", FieldKind::Timestamp)
            .relation(Relation::has_many("posts", "posts", "user_id"))
            .options("id", "name"),
    );
    registry.register(
        ResourceDescriptor::new("posts", "posts")
            .field("user_id", FieldKind::Integer)
            .field("title", FieldKind::Text)
            .field("published", FieldKind::Boolean)
            .relation(Relation::belongs_to("author", "users", "user_id"))
            .relation(Relation::has_many("comments", "comments", "post_id"))
            .options("id", "title"),
    );
    registry.register(
        ResourceDescriptor::new("comments", "comments")
            .primary_key("id", KeyKind::Uuid)
            .field("post_id", FieldKind::Integer)
            .field("body", FieldKind::Text)
            .without_timestamps()
            .relation(Relation::belongs_to("post", "posts", "post_id")),
    );
    registry
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&url).await?;

    Migrator::refresh(&db).await?;

    Ok(db)
}

pub async fn setup_test_app() -> TestApp {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    let registry = Arc::new(registry());
    let store = Arc::new(SeaOrmStore::new(db.clone(), registry.clone()));
    TestApp {
        db,
        registry,
        store,
    }
}

pub fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().copied().collect()
}

pub async fn create(repo: &Repository, pairs: &[(&str, &str)]) -> Record {
    repo.store(&params(pairs))
        .await
        .expect("Failed to create record")
}

/// Integer primary key of a fetched record, as the string the operations expect.
pub fn id_of(record: &Record) -> String {
    match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        other => panic!("record has no usable id: {other:?}"),
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateTables)]
    }
}

pub struct CreateTables;

#[async_trait::async_trait]
impl MigrationName for CreateTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_users_posts_comments"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().null())
                    .col(ColumnDef::new(Users::Email).string().null().unique_key())
                    .col(ColumnDef::new(Users::Age).integer().null())
                    .col(ColumnDef::new(Users::Status).string().null())
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::UserId).integer().null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Posts::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::PostId).integer().not_null())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Age,
    Status,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    Title,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    Body,
}
