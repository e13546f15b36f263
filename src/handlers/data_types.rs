use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::database::data_types;
use crate::error::ApiError;

use super::AppState;

/// GET /api/v1/data-types - data-type tags available to schema authoring
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let data_types = data_types::find(&state.pool).await?;

    Ok(Json(json!({ "success": true, "data": data_types })))
}
