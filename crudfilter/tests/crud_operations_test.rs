use std::sync::Arc;

use crudfilter::{ApiError, CrudOperations, FieldKind, Repository, ResourceDescriptor, SelectOption};
use serde_json::{Value, json};

mod common;
use common::{create, id_of, params, setup_test_app};

#[tokio::test]
async fn test_store_coerces_and_returns_record() {
    let app = setup_test_app().await;
    let users = app.repository("users");

    let record = users
        .store(&params(&[
            ("name", "Ada"),
            ("age", " 36 "),
            ("password", "hunter2"),
            ("id", "999"),
        ]))
        .await
        .unwrap();

    assert_eq!(record["name"], "Ada");
    assert_eq!(record["age"], 36);
    assert_ne!(record["id"], 999);
    assert!(!record.contains_key("password"));
    assert!(!record["created_at"].is_null());
    assert!(!record["updated_at"].is_null());
}

#[tokio::test]
async fn test_store_returns_requested_relations() {
    let app = setup_test_app().await;
    let ada = create(&app.repository("users"), &[("name", "Ada")]).await;
    let ada_id = id_of(&ada);

    let post = app
        .repository("posts")
        .store(&params(&[
            ("user_id", ada_id.as_str()),
            ("title", "Engines"),
            ("contain", "author"),
            ("count", "comments"),
        ]))
        .await
        .unwrap();

    assert_eq!(post["author"]["name"], "Ada");
    assert_eq!(post["comments_count"], 0);
}

#[tokio::test]
async fn test_store_rejects_uncoercible_values() {
    let app = setup_test_app().await;

    let err = app
        .repository("users")
        .store(&params(&[("name", "Ada"), ("age", "old")]))
        .await
        .unwrap_err();

    match err {
        ApiError::ValidationFailed { errors } => {
            assert_eq!(errors, vec!["age: expected an integer".to_string()]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(app.repository("users").count(&params(&[])).await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_duplicate_is_conflict() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    create(&users, &[("name", "Ada"), ("email", "ada@example.com")]).await;

    let err = users
        .store(&params(&[("name", "Imposter"), ("email", "ada@example.com")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "{err:?}");
}

#[tokio::test]
async fn test_modify_writes_and_refetches() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    let ada = create(&users, &[("name", "Ada"), ("age", "36"), ("status", "active")]).await;
    let id = id_of(&ada);

    let updated = users
        .modify(&params(&[("age", "37"), ("status", ""), ("deleted_at", "")]), &id)
        .await
        .unwrap();

    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["age"], 37);
    assert_eq!(updated["status"], "");
    assert!(updated["deleted_at"].is_null());
}

#[tokio::test]
async fn test_modify_nullable_empty_writes_null() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    let gone = create(&users, &[("name", "Gone"), ("deleted_at", "2024-01-01")]).await;
    assert!(!gone["deleted_at"].is_null());

    let restored = users
        .modify(&params(&[("deleted_at", "")]), &id_of(&gone))
        .await
        .unwrap();
    assert!(restored["deleted_at"].is_null());
}

#[tokio::test]
async fn test_modify_missing_is_not_found() {
    let app = setup_test_app().await;

    let err = app
        .repository("users")
        .modify(&params(&[("name", "Nobody")]), "404")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_remove() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    let ada = create(&users, &[("name", "Ada")]).await;
    let id = id_of(&ada);

    assert!(users.remove(&id).await.unwrap());
    assert!(users.get_by_id(&id, &params(&[])).await.unwrap().is_none());
    assert!(!users.remove(&id).await.unwrap());
    assert!(!users.remove("12345").await.unwrap());
}

#[tokio::test]
async fn test_get_by_id_ignores_filters() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    let ada = create(&users, &[("name", "Ada"), ("status", "active")]).await;

    let found = users
        .get_by_id(&id_of(&ada), &params(&[("status", "banned")]))
        .await
        .unwrap();
    assert_eq!(found.unwrap()["name"], "Ada");
    assert!(users.get_by_id("999", &params(&[])).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_options_sorted_without_falsy_labels() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    let zed = create(&users, &[("name", "Zed")]).await;
    let amy = create(&users, &[("name", "Amy")]).await;
    create(&users, &[("name", "")]).await;
    create(&users, &[("name", "0")]).await;
    create(&users, &[("age", "3")]).await;
    let mia = create(&users, &[("name", "Mia")]).await;

    let options = users.get_options().await.unwrap();

    let expected: Vec<SelectOption> = [amy, mia, zed]
        .iter()
        .map(|r| SelectOption {
            value: r["id"].clone(),
            label: r["name"].clone(),
        })
        .collect();
    assert_eq!(options, expected);
    assert!(options.iter().all(|o| o.label != Value::from("0")));
}

#[tokio::test]
async fn test_get_options_label_need_not_be_writable() {
    let app = setup_test_app().await;
    let users = app.repository("users");
    create(&users, &[("name", "Zed"), ("email", "zed@example.com")]).await;
    create(&users, &[("name", "Amy"), ("email", "amy@example.com")]).await;
    create(&users, &[("name", "Nobody")]).await;

    let contacts = Repository::new(
        Arc::new(
            ResourceDescriptor::new("contacts", "users")
                .field("name", FieldKind::Text)
                .options("id", "email"),
        ),
        app.store.clone(),
    );

    let labels: Vec<Value> = contacts
        .get_options()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(labels, vec![json!("amy@example.com"), json!("zed@example.com")]);

    let page = contacts
        .get_all(&params(&[("sort", "email:desc"), ("email", "zed@example.com")]))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let emails: Vec<&str> = page.data.iter().filter_map(|r| r["email"].as_str()).collect();
    assert_eq!(emails, vec!["zed@example.com", "amy@example.com"]);
}
