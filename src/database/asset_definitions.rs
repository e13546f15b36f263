//! Schema catalog accessor: asset types and the property definitions that
//! describe the expected shape of every asset of a type.

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::database::models::{AssetPropertySummary, AssetType, Property};
use crate::database::DatabaseError;

const PROPERTY_COLUMNS: &str = "id, asset_type_id, name, data_type, required, is_private";

/// An asset type grouped with its property definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub asset_type: AssetType,
    pub properties: Vec<Property>,
}

/// Request shape for authoring a new asset definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssetDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub properties: Vec<NewProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub is_private: bool,
}

/// All asset types, ordered by id.
pub async fn find_asset_types(db: impl PgExecutor<'_>) -> Result<Vec<AssetType>, DatabaseError> {
    let types = sqlx::query_as::<_, AssetType>(
        "SELECT id, name, description FROM asset_type ORDER BY id",
    )
    .fetch_all(db)
    .await?;

    Ok(types)
}

/// All property definitions across every asset type.
pub async fn find_properties(db: impl PgExecutor<'_>) -> Result<Vec<Property>, DatabaseError> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM property ORDER BY id");
    let properties = sqlx::query_as::<_, Property>(&sql).fetch_all(db).await?;

    Ok(properties)
}

/// Property definitions registered for one asset type, ordered by id.
/// Private properties are withheld unless `include_private` is set.
pub async fn find_properties_for_type(
    db: impl PgExecutor<'_>,
    asset_type_id: i32,
    include_private: bool,
) -> Result<Vec<Property>, DatabaseError> {
    let sql = if include_private {
        format!("SELECT {PROPERTY_COLUMNS} FROM property WHERE asset_type_id = $1 ORDER BY id")
    } else {
        format!(
            "SELECT {PROPERTY_COLUMNS} FROM property \
             WHERE asset_type_id = $1 AND is_private = FALSE ORDER BY id"
        )
    };

    let properties = sqlx::query_as::<_, Property>(&sql)
        .bind(asset_type_id)
        .fetch_all(db)
        .await?;

    Ok(properties)
}

/// Every asset type grouped with its property definitions.
pub async fn find_definitions(pool: &PgPool) -> Result<Vec<AssetDefinition>, DatabaseError> {
    let types = find_asset_types(pool).await?;
    let properties = find_properties(pool).await?;

    let definitions = types
        .into_iter()
        .map(|asset_type| {
            let properties = properties
                .iter()
                .filter(|property| property.asset_type_id == asset_type.id)
                .cloned()
                .collect();
            AssetDefinition { asset_type, properties }
        })
        .collect();

    Ok(definitions)
}

/// Create an asset type and its property definitions in one transaction.
/// Returns the new asset type's id.
pub async fn create_definition(
    pool: &PgPool,
    definition: &NewAssetDefinition,
) -> Result<i32, DatabaseError> {
    let mut tx = pool.begin().await?;

    let (asset_type_id,): (i32,) = sqlx::query_as(
        "INSERT INTO asset_type (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(&definition.name)
    .bind(&definition.description)
    .fetch_one(&mut *tx)
    .await?;

    for property in &definition.properties {
        sqlx::query(
            "INSERT INTO property (asset_type_id, name, data_type, required, is_private) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(asset_type_id)
        .bind(&property.name)
        .bind(&property.data_type)
        .bind(property.required)
        .bind(property.is_private)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(asset_type_id)
}

/// Current non-private property values of every asset of a type, joined with
/// the asset's location for map rendering.
pub async fn find_asset_props_by_type(
    db: impl PgExecutor<'_>,
    asset_type_id: i32,
) -> Result<Vec<AssetPropertySummary>, DatabaseError> {
    let summaries = sqlx::query_as::<_, AssetPropertySummary>(
        "SELECT \
             asset.id        AS asset_id, \
             asset.longitude AS longitude, \
             asset.latitude  AS latitude, \
             asset_property.property_id AS property_id, \
             asset_property.value       AS value \
         FROM asset \
             JOIN asset_property ON asset_property.asset_id = asset.id \
             JOIN property       ON asset_property.property_id = property.id \
         WHERE asset.asset_type_id = $1 AND property.is_private = FALSE \
         ORDER BY property_id",
    )
    .bind(asset_type_id)
    .fetch_all(db)
    .await?;

    Ok(summaries)
}
