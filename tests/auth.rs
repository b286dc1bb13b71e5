//! Signup/login flow and bearer-token resolution against an in-memory
//! SQLite database.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;

use hackernews::auth::{self, JwtSecret};
use hackernews::graphql::{self, AppSchema};
use hackernews::migration::Migrator;
use hackernews::store::Store;

const SECRET: &str = "test-secret";

async fn setup() -> (AppSchema, Store) {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let store = Store::new(db);
    let schema = graphql::build_schema(store.clone(), JwtSecret(SECRET.into()));
    (schema, store)
}

async fn signup(schema: &AppSchema) -> String {
    let resp = schema
        .execute(
            r#"mutation { signup(name: "Alice", email: "alice@example.com", password: "hunter2") { token user { email } } }"#,
        )
        .await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["signup"]["user"]["email"], "alice@example.com");
    data["signup"]["token"].as_str().unwrap().to_owned()
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    headers
}

#[tokio::test]
async fn signup_token_resolves_the_same_user() {
    let (schema, store) = setup().await;
    let token = signup(&schema).await;

    let user = auth::authenticate(&store, SECRET, &bearer_headers(&token))
        .await
        .expect("token should resolve");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.name, "Alice");
}

#[tokio::test]
async fn login_verifies_credentials() {
    let (schema, _store) = setup().await;
    signup(&schema).await;

    let resp = schema
        .execute(r#"mutation { login(email: "alice@example.com", password: "hunter2") { token user { name } } }"#)
        .await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["login"]["user"]["name"], "Alice");
    assert!(!data["login"]["token"].as_str().unwrap().is_empty());

    let resp = schema
        .execute(r#"mutation { login(email: "alice@example.com", password: "wrong") { token } }"#)
        .await;
    assert_eq!(resp.errors.len(), 1);
    assert!(resp.errors[0].message.contains("invalid email or password"));

    let resp = schema
        .execute(r#"mutation { login(email: "nobody@example.com", password: "hunter2") { token } }"#)
        .await;
    assert_eq!(resp.errors.len(), 1);
    assert!(resp.errors[0].message.contains("invalid email or password"));
}

#[tokio::test]
async fn duplicate_email_signup_is_a_domain_error() {
    let (schema, _store) = setup().await;
    signup(&schema).await;

    let resp = schema
        .execute(
            r#"mutation { signup(name: "Other", email: "alice@example.com", password: "pw") { token } }"#,
        )
        .await;
    assert_eq!(resp.errors.len(), 1);
    assert!(
        resp.errors[0].message.contains("already exists"),
        "{}",
        resp.errors[0].message
    );
}

#[tokio::test]
async fn invalid_tokens_resolve_to_no_user() {
    let (_schema, store) = setup().await;

    assert!(auth::authenticate(&store, SECRET, &HeaderMap::new())
        .await
        .is_none());
    assert!(
        auth::authenticate(&store, SECRET, &bearer_headers("garbage"))
            .await
            .is_none()
    );

    // Structurally valid token, but no such user.
    let token = auth::issue_token(SECRET, 999).unwrap();
    assert!(auth::authenticate(&store, SECRET, &bearer_headers(&token))
        .await
        .is_none());
}

#[tokio::test]
async fn me_reflects_the_request_user() {
    let (schema, store) = setup().await;
    let token = signup(&schema).await;
    let user = auth::authenticate(&store, SECRET, &bearer_headers(&token))
        .await
        .unwrap();

    let resp = schema
        .execute(async_graphql::Request::new("{ me { email } }").data(user))
        .await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["me"]["email"], "alice@example.com");

    let resp = schema.execute("{ me { email } }").await;
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["me"], Value::Null);
}

#[tokio::test]
async fn posted_links_are_attributed_to_the_current_user() {
    let (schema, store) = setup().await;
    let token = signup(&schema).await;
    let user = auth::authenticate(&store, SECRET, &bearer_headers(&token))
        .await
        .unwrap();

    let resp = schema
        .execute(
            async_graphql::Request::new(
                r#"mutation { postLink(description: "test", url: "http://x") { postedBy { email links { url } } } }"#,
            )
            .data(user),
        )
        .await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["postLink"]["postedBy"]["email"], "alice@example.com");
    assert_eq!(data["postLink"]["postedBy"]["links"][0]["url"], "http://x");

    // Anonymous submissions have no owner.
    let resp = schema
        .execute(r#"mutation { postLink(description: "anon", url: "http://y") { postedBy { id } } }"#)
        .await;
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["postLink"]["postedBy"], Value::Null);
}
