//! Merges parsed tabular input into stored asset property state.
//!
//! The caller hands over an asset type id and an ordered list of rows, each
//! a mapping from column name to raw string value. Structural checks run
//! against the first row before anything is written; every read and write
//! after that happens inside one transaction, so a rejection anywhere rolls
//! the whole batch back. Rows are applied strictly in input order - a later
//! row sees the values an earlier row wrote.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::info;

use crate::database::models::Property;
use crate::database::{asset_definitions, assets, DatabaseError};

/// One parsed input row: column name -> raw string value.
pub type ImportRow = BTreeMap<String, String>;

const ASSET_ID_COLUMN: &str = "asset_id";
const LONGITUDE_COLUMN: &str = "longitude";
const LATITUDE_COLUMN: &str = "latitude";

/// Columns with fixed meaning in every import, never treated as properties.
const RESERVED_COLUMNS: [&str; 3] = [ASSET_ID_COLUMN, LONGITUDE_COLUMN, LATITUDE_COLUMN];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the import contains no rows")]
    EmptyInput,

    #[error("the import is missing an asset_id column")]
    MissingAssetIdColumn,

    #[error("the import is missing a latitude and/or longitude column")]
    MissingCoordinateColumns,

    #[error("the import is missing a column for property '{property}'")]
    MissingPropertyColumn { property: String },

    #[error("row {row} is missing an asset id")]
    MissingAssetId { row: usize },

    #[error("asset '{asset_id}' is not being tracked")]
    UnknownAsset { asset_id: String },

    #[error("asset '{asset_id}' belongs to a different asset type than the one selected")]
    AssetTypeMismatch { asset_id: String },

    #[error("column '{column}' is not a property of the selected asset type")]
    UnknownProperty { column: String },

    #[error("missing required value for property '{property}' (asset '{asset_id}')")]
    MissingRequiredValue { property: String, asset_id: String },

    #[error("asset '{asset_id}' has an unreadable longitude and/or latitude value")]
    InvalidCoordinates { asset_id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Counts reported back to the caller after a committed import.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub values_created: usize,
    pub values_updated: usize,
}

/// Properties of the target asset type keyed by column name, built once per
/// import so row processing is a plain map lookup.
struct PropertyMap {
    by_name: BTreeMap<String, Property>,
}

impl PropertyMap {
    fn new(properties: Vec<Property>) -> Self {
        let by_name = properties
            .into_iter()
            .map(|property| (property.name.clone(), property))
            .collect();
        Self { by_name }
    }

    fn get(&self, column: &str) -> Option<&Property> {
        self.by_name.get(column)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

/// What to do with an incoming value given the stored one.
#[derive(Debug, PartialEq, Eq)]
enum ValueAction {
    Create,
    Replace,
    Keep,
}

fn value_action(current: Option<&str>, incoming: &str) -> ValueAction {
    match current {
        None => ValueAction::Create,
        Some(stored) if stored != incoming => ValueAction::Replace,
        Some(_) => ValueAction::Keep,
    }
}

/// Structural checks against the first row. The remaining rows are assumed
/// to share its columns; anything they add is caught per row.
fn check_headers(properties: &PropertyMap, first_row: &ImportRow) -> Result<(), ImportError> {
    if !first_row.contains_key(ASSET_ID_COLUMN) {
        return Err(ImportError::MissingAssetIdColumn);
    }
    if !first_row.contains_key(LATITUDE_COLUMN) || !first_row.contains_key(LONGITUDE_COLUMN) {
        return Err(ImportError::MissingCoordinateColumns);
    }
    for name in properties.names() {
        if !first_row.contains_key(name) {
            return Err(ImportError::MissingPropertyColumn { property: name.to_string() });
        }
    }
    Ok(())
}

fn parse_coordinates(row: &ImportRow, asset_id: &str) -> Result<(f64, f64), ImportError> {
    let longitude = row
        .get(LONGITUDE_COLUMN)
        .and_then(|raw| raw.trim().parse::<f64>().ok());
    let latitude = row
        .get(LATITUDE_COLUMN)
        .and_then(|raw| raw.trim().parse::<f64>().ok());

    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Ok((longitude, latitude)),
        _ => Err(ImportError::InvalidCoordinates { asset_id: asset_id.to_string() }),
    }
}

pub struct ImportService {
    pool: PgPool,
}

impl ImportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate the rows against the asset type's registered properties and
    /// merge them into stored state.
    ///
    /// On success every row has been applied and committed. On error nothing
    /// has been applied: the transaction guard rolls back when dropped, and
    /// its connection goes back to the pool either way.
    pub async fn import(
        &self,
        asset_type_id: i32,
        rows: &[ImportRow],
    ) -> Result<ImportSummary, ImportError> {
        let properties =
            asset_definitions::find_properties_for_type(&self.pool, asset_type_id, true).await?;
        let properties = PropertyMap::new(properties);

        let first_row = rows.first().ok_or(ImportError::EmptyInput)?;
        check_headers(&properties, first_row)?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Sqlx)?;
        let mut summary = ImportSummary::default();
        for (index, row) in rows.iter().enumerate() {
            apply_row(&mut tx, asset_type_id, &properties, index, row, &mut summary).await?;
        }
        tx.commit().await.map_err(DatabaseError::Sqlx)?;

        info!(
            asset_type_id,
            rows = summary.rows,
            created = summary.values_created,
            updated = summary.values_updated,
            "import committed"
        );
        Ok(summary)
    }
}

async fn apply_row(
    conn: &mut PgConnection,
    asset_type_id: i32,
    properties: &PropertyMap,
    index: usize,
    row: &ImportRow,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let asset_id = row.get(ASSET_ID_COLUMN).map(String::as_str).unwrap_or("");
    if asset_id.is_empty() {
        return Err(ImportError::MissingAssetId { row: index + 1 });
    }

    let asset = assets::find_asset(&mut *conn, asset_id)
        .await?
        .ok_or_else(|| ImportError::UnknownAsset { asset_id: asset_id.to_string() })?;
    if asset.asset_type_id != asset_type_id {
        return Err(ImportError::AssetTypeMismatch { asset_id: asset_id.to_string() });
    }

    for (column, value) in row {
        if RESERVED_COLUMNS.contains(&column.as_str()) {
            continue;
        }

        let property = properties
            .get(column)
            .ok_or_else(|| ImportError::UnknownProperty { column: column.clone() })?;

        if value.is_empty() {
            if property.required {
                return Err(ImportError::MissingRequiredValue {
                    property: column.clone(),
                    asset_id: asset_id.to_string(),
                });
            }
            continue;
        }

        let current = assets::find_asset_property(&mut *conn, asset_id, property.id).await?;
        match value_action(current.as_ref().map(|p| p.value.as_str()), value) {
            ValueAction::Create => {
                assets::append_history(&mut *conn, asset_id, property.id, value, Utc::now())
                    .await?;
                assets::create_asset_property(&mut *conn, asset_id, property.id, value).await?;
                summary.values_created += 1;
            }
            ValueAction::Replace => {
                assets::append_history(&mut *conn, asset_id, property.id, value, Utc::now())
                    .await?;
                assets::update_asset_property(&mut *conn, asset_id, property.id, value).await?;
                summary.values_updated += 1;
            }
            ValueAction::Keep => {}
        }
    }

    let (longitude, latitude) = parse_coordinates(row, asset_id)?;
    assets::update_location(&mut *conn, asset_id, longitude, latitude).await?;
    summary.rows += 1;

    Ok(())
}
