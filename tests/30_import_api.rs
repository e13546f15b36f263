//! End-to-end import scenarios. Each test seeds its own asset type,
//! property, and asset directly through the database, then drives the import
//! endpoint and asserts on committed state.

mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

async fn test_pool() -> Result<PgPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;
    Ok(pool)
}

/// Insert an asset type with one required `count` property, returning
/// (asset_type_id, property_id).
async fn seed_definition(pool: &PgPool, type_name: &str) -> Result<(i32, i32)> {
    let (asset_type_id,): (i32,) = sqlx::query_as(
        "INSERT INTO asset_type (name, description) VALUES ($1, 'import test') RETURNING id",
    )
    .bind(type_name)
    .fetch_one(pool)
    .await?;

    let (property_id,): (i32,) = sqlx::query_as(
        "INSERT INTO property (asset_type_id, name, data_type, required) \
         VALUES ($1, 'count', 'number', TRUE) RETURNING id",
    )
    .bind(asset_type_id)
    .fetch_one(pool)
    .await?;

    Ok((asset_type_id, property_id))
}

/// Insert a fresh asset with no location and no property values.
async fn seed_asset(pool: &PgPool, asset_id: &str, asset_type_id: i32) -> Result<()> {
    sqlx::query("DELETE FROM history WHERE asset_id = $1")
        .bind(asset_id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM asset_property WHERE asset_id = $1")
        .bind(asset_id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM asset WHERE id = $1")
        .bind(asset_id)
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO asset (id, asset_type_id) VALUES ($1, $2)")
        .bind(asset_id)
        .bind(asset_type_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn post_import(base_url: &str, asset_type_id: i32, rows: Value) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/v1/asset-types/{}/import", base_url, asset_type_id))
        .json(&rows)
        .send()
        .await?;
    Ok(res)
}

async fn current_value(pool: &PgPool, asset_id: &str, property_id: i32) -> Result<Option<String>> {
    let value: Option<(String,)> =
        sqlx::query_as("SELECT value FROM asset_property WHERE asset_id = $1 AND property_id = $2")
            .bind(asset_id)
            .bind(property_id)
            .fetch_optional(pool)
            .await?;
    Ok(value.map(|(v,)| v))
}

async fn history_count(pool: &PgPool, asset_id: &str, property_id: i32) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM history WHERE asset_id = $1 AND property_id = $2")
            .bind(asset_id)
            .bind(property_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn first_value_creates_property_and_history() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-create").await?;
    seed_asset(&pool, "A1-create", asset_type_id).await?;

    let rows = json!([
        { "asset_id": "A1-create", "latitude": "1.0", "longitude": "2.0", "count": "3" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], json!(true), "{}", body);
    assert_eq!(body["data"]["values_created"], json!(1), "{}", body);

    assert_eq!(current_value(&pool, "A1-create", property_id).await?.as_deref(), Some("3"));
    assert_eq!(history_count(&pool, "A1-create", property_id).await?, 1);

    let (longitude, latitude): (Option<f64>, Option<f64>) =
        sqlx::query_as("SELECT longitude, latitude FROM asset WHERE id = $1")
            .bind("A1-create")
            .fetch_one(&pool)
            .await?;
    assert_eq!(longitude, Some(2.0));
    assert_eq!(latitude, Some(1.0));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn empty_required_value_rejects_and_commits_nothing() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-required").await?;
    seed_asset(&pool, "A1-required", asset_type_id).await?;

    let rows = json!([
        { "asset_id": "A1-required", "latitude": "1.0", "longitude": "2.0", "count": "" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = res.json::<Value>().await?;
    let error = body["error"].as_str().unwrap_or("");
    assert!(error.contains("count"), "error should name the property: {}", body);
    assert!(error.contains("A1-required"), "error should name the asset: {}", body);

    assert_eq!(current_value(&pool, "A1-required", property_id).await?, None);
    assert_eq!(history_count(&pool, "A1-required", property_id).await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn late_row_failure_rolls_back_earlier_rows() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-atomic").await?;
    seed_asset(&pool, "A1-atomic", asset_type_id).await?;

    let rows = json!([
        { "asset_id": "A1-atomic", "latitude": "1.0", "longitude": "2.0", "count": "3" },
        { "asset_id": "A2-untracked", "latitude": "1.0", "longitude": "2.0", "count": "4" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = res.json::<Value>().await?;
    assert!(
        body["error"].as_str().unwrap_or("").contains("A2-untracked"),
        "error should name the unknown asset: {}",
        body
    );

    // The valid first row must not have been committed
    assert_eq!(current_value(&pool, "A1-atomic", property_id).await?, None);
    assert_eq!(history_count(&pool, "A1-atomic", property_id).await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn unchanged_value_writes_no_history() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-unchanged").await?;
    seed_asset(&pool, "A1-unchanged", asset_type_id).await?;

    let rows = json!([
        { "asset_id": "A1-unchanged", "latitude": "1.0", "longitude": "2.0", "count": "3" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Same value again: value untouched, no new history entry
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["values_created"], json!(0), "{}", body);
    assert_eq!(body["data"]["values_updated"], json!(0), "{}", body);

    assert_eq!(current_value(&pool, "A1-unchanged", property_id).await?.as_deref(), Some("3"));
    assert_eq!(history_count(&pool, "A1-unchanged", property_id).await?, 1);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn changed_value_updates_in_place_and_appends_history() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-changed").await?;
    seed_asset(&pool, "A1-changed", asset_type_id).await?;

    let first = json!([
        { "asset_id": "A1-changed", "latitude": "1.0", "longitude": "2.0", "count": "3" }
    ]);
    post_import(&server.base_url, asset_type_id, first).await?;

    let second = json!([
        { "asset_id": "A1-changed", "latitude": "1.0", "longitude": "2.0", "count": "4" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, second).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["values_updated"], json!(1), "{}", body);

    assert_eq!(current_value(&pool, "A1-changed", property_id).await?.as_deref(), Some("4"));
    assert_eq!(history_count(&pool, "A1-changed", property_id).await?, 2);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn missing_header_fails_before_any_write() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, property_id) = seed_definition(&pool, "import-headers").await?;
    seed_asset(&pool, "A1-headers", asset_type_id).await?;

    // No latitude/longitude columns at all
    let rows = json!([
        { "asset_id": "A1-headers", "count": "3" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(current_value(&pool, "A1-headers", property_id).await?, None);
    assert_eq!(history_count(&pool, "A1-headers", property_id).await?, 0);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres reachable via DATABASE_URL"]
async fn wrong_asset_type_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let pool = test_pool().await?;

    let (asset_type_id, _) = seed_definition(&pool, "import-mismatch-a").await?;
    let (other_type_id, _) = seed_definition(&pool, "import-mismatch-b").await?;
    seed_asset(&pool, "A1-mismatch", other_type_id).await?;

    let rows = json!([
        { "asset_id": "A1-mismatch", "latitude": "1.0", "longitude": "2.0", "count": "3" }
    ]);
    let res = post_import(&server.base_url, asset_type_id, rows).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = res.json::<Value>().await?;
    assert!(
        body["error"].as_str().unwrap_or("").contains("A1-mismatch"),
        "error should name the asset: {}",
        body
    );

    Ok(())
}
