//! Asset store accessor: single-statement reads and writes over assets,
//! their current property values, and the change history. Every statement is
//! parameterized; callers choose the executor, so the same functions run
//! against the pool or inside an open transaction.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::database::models::{Asset, AssetProperty, BoundingBox};
use crate::database::DatabaseError;

const ASSET_COLUMNS: &str = "id, asset_type_id, project_id, longitude, latitude";

/// All tracked assets, optionally restricted to one project.
pub async fn find(
    db: impl PgExecutor<'_>,
    project_id: Option<i32>,
) -> Result<Vec<Asset>, DatabaseError> {
    let assets = match project_id {
        Some(project_id) => {
            let sql = format!("SELECT {ASSET_COLUMNS} FROM asset WHERE project_id = $1 ORDER BY id");
            sqlx::query_as::<_, Asset>(&sql)
                .bind(project_id)
                .fetch_all(db)
                .await?
        }
        None => {
            let sql = format!("SELECT {ASSET_COLUMNS} FROM asset ORDER BY id");
            sqlx::query_as::<_, Asset>(&sql).fetch_all(db).await?
        }
    };

    Ok(assets)
}

/// Extent of the located assets, optionally restricted to one project.
/// Every field is null when no asset in scope has a location yet.
pub async fn bounding_box(
    db: impl PgExecutor<'_>,
    project_id: Option<i32>,
) -> Result<BoundingBox, DatabaseError> {
    const BBOX_COLUMNS: &str = "MIN(latitude)  AS latitude_min, \
                                MAX(latitude)  AS latitude_max, \
                                MIN(longitude) AS longitude_min, \
                                MAX(longitude) AS longitude_max";

    let bbox = match project_id {
        Some(project_id) => {
            let sql = format!("SELECT {BBOX_COLUMNS} FROM asset WHERE project_id = $1");
            sqlx::query_as::<_, BoundingBox>(&sql)
                .bind(project_id)
                .fetch_one(db)
                .await?
        }
        None => {
            let sql = format!("SELECT {BBOX_COLUMNS} FROM asset");
            sqlx::query_as::<_, BoundingBox>(&sql).fetch_one(db).await?
        }
    };

    Ok(bbox)
}

/// Look up one asset by its externally supplied id.
pub async fn find_asset(
    db: impl PgExecutor<'_>,
    asset_id: &str,
) -> Result<Option<Asset>, DatabaseError> {
    let sql = format!("SELECT {ASSET_COLUMNS} FROM asset WHERE id = $1");
    let asset = sqlx::query_as::<_, Asset>(&sql)
        .bind(asset_id)
        .fetch_optional(db)
        .await?;

    Ok(asset)
}

/// Current value for one (asset, property) pair, if any.
pub async fn find_asset_property(
    db: impl PgExecutor<'_>,
    asset_id: &str,
    property_id: i32,
) -> Result<Option<AssetProperty>, DatabaseError> {
    let property = sqlx::query_as::<_, AssetProperty>(
        "SELECT asset_id, property_id, value FROM asset_property \
         WHERE asset_id = $1 AND property_id = $2",
    )
    .bind(asset_id)
    .bind(property_id)
    .fetch_optional(db)
    .await?;

    Ok(property)
}

/// First value for a (asset, property) pair.
pub async fn create_asset_property(
    db: impl PgExecutor<'_>,
    asset_id: &str,
    property_id: i32,
    value: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO asset_property (asset_id, property_id, value) VALUES ($1, $2, $3)")
        .bind(asset_id)
        .bind(property_id)
        .bind(value)
        .execute(db)
        .await?;

    Ok(())
}

/// Replace the stored value for a (asset, property) pair.
pub async fn update_asset_property(
    db: impl PgExecutor<'_>,
    asset_id: &str,
    property_id: i32,
    value: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE asset_property SET value = $1 WHERE asset_id = $2 AND property_id = $3")
        .bind(value)
        .bind(asset_id)
        .bind(property_id)
        .execute(db)
        .await?;

    Ok(())
}

/// Append one immutable history entry for a value that is about to be
/// created or changed.
pub async fn append_history(
    db: impl PgExecutor<'_>,
    asset_id: &str,
    property_id: i32,
    value: &str,
    date: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO history (asset_id, property_id, value, date) VALUES ($1, $2, $3, $4)")
        .bind(asset_id)
        .bind(property_id)
        .bind(value)
        .bind(date)
        .execute(db)
        .await?;

    Ok(())
}

/// Set an asset's location to the given coordinates.
pub async fn update_location(
    db: impl PgExecutor<'_>,
    asset_id: &str,
    longitude: f64,
    latitude: f64,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE asset SET longitude = $1, latitude = $2 WHERE id = $3")
        .bind(longitude)
        .bind(latitude)
        .bind(asset_id)
        .execute(db)
        .await?;

    Ok(())
}
