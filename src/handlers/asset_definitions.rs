use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::asset_definitions::{self, NewAssetDefinition};
use crate::error::ApiError;
use crate::services::{ImportRow, ImportService};

use super::{parse_key, AppState};

#[derive(Debug, Deserialize)]
pub struct PropertyQuery {
    /// Include private properties in the listing. Off by default.
    pub include_private: Option<bool>,
}

/// GET /api/v1/asset-types - all asset types
pub async fn list_asset_types(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let types = asset_definitions::find_asset_types(&state.pool).await?;

    Ok(Json(json!({ "success": true, "data": types })))
}

/// GET /api/v1/asset-definitions - every asset type with its properties
pub async fn list_definitions(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let definitions = asset_definitions::find_definitions(&state.pool).await?;

    Ok(Json(json!({ "success": true, "data": definitions })))
}

/// POST /api/v1/asset-definitions - create an asset type and its properties
/// atomically, returning the new asset type's id
pub async fn create_definition(
    State(state): State<AppState>,
    Json(definition): Json<NewAssetDefinition>,
) -> Result<Json<Value>, ApiError> {
    if definition.name.trim().is_empty() {
        return Err(ApiError::bad_request("asset definition name must not be empty"));
    }
    if definition.properties.iter().any(|p| p.name.trim().is_empty()) {
        return Err(ApiError::bad_request("property names must not be empty"));
    }

    let asset_type_id = asset_definitions::create_definition(&state.pool, &definition).await?;

    Ok(Json(json!({ "success": true, "data": { "asset_type_id": asset_type_id } })))
}

/// GET /api/v1/asset-types/:id/properties - property definitions for one
/// asset type, non-private by default
pub async fn list_properties(
    State(state): State<AppState>,
    Path(asset_type_id): Path<i64>,
    Query(query): Query<PropertyQuery>,
) -> Result<Json<Value>, ApiError> {
    let asset_type_id = require_key("asset type id", asset_type_id)?;
    let include_private = query.include_private.unwrap_or(false);

    let properties =
        asset_definitions::find_properties_for_type(&state.pool, asset_type_id, include_private)
            .await?;

    Ok(Json(json!({ "success": true, "data": properties })))
}

/// GET /api/v1/asset-types/:id/asset-properties - current non-private values
/// of every asset of the type, with locations, for map rendering
pub async fn list_asset_properties(
    State(state): State<AppState>,
    Path(asset_type_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let asset_type_id = require_key("asset type id", asset_type_id)?;

    let summaries =
        asset_definitions::find_asset_props_by_type(&state.pool, asset_type_id).await?;

    Ok(Json(json!({ "success": true, "data": summaries })))
}

/// POST /api/v1/asset-types/:id/import - merge parsed CSV rows into the
/// assets of one type. All-or-nothing: a rejected row rolls back the batch.
pub async fn import(
    State(state): State<AppState>,
    Path(asset_type_id): Path<i64>,
    Json(rows): Json<Vec<ImportRow>>,
) -> Result<Json<Value>, ApiError> {
    let asset_type_id = require_key("asset type id", asset_type_id)?;

    let summary = ImportService::new(state.pool).import(asset_type_id, &rows).await?;

    Ok(Json(json!({ "success": true, "data": summary })))
}

fn require_key(name: &str, key: i64) -> Result<i32, ApiError> {
    parse_key(name, Some(key))?.ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}
