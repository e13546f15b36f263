use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::assets;
use crate::error::ApiError;

use super::{parse_key, AppState};

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    /// Restrict the listing to one project's assets.
    pub project_id: Option<i64>,
}

/// GET /api/v1/assets - list tracked assets, optionally for one project
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<Value>, ApiError> {
    let project_id = parse_key("project_id", query.project_id)?;
    let assets = assets::find(&state.pool, project_id).await?;

    Ok(Json(json!({ "success": true, "data": assets })))
}

/// GET /api/v1/assets/bbox - bounding box of asset locations, optionally for
/// one project. Fields are null until an asset in scope has a location.
pub async fn bbox(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<Value>, ApiError> {
    let project_id = parse_key("project_id", query.project_id)?;
    let bbox = assets::bounding_box(&state.pool, project_id).await?;

    Ok(Json(json!({ "success": true, "data": bbox })))
}
