pub mod asset_definitions;
pub mod assets;
pub mod data_types;

use sqlx::PgPool;

use crate::database::is_valid_db_key;
use crate::error::ApiError;

/// Shared handler state, cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Bounds-check a caller-supplied integer key before it reaches a query.
pub(crate) fn parse_key(name: &str, key: Option<i64>) -> Result<Option<i32>, ApiError> {
    match key {
        None => Ok(None),
        Some(key) if is_valid_db_key(key) => Ok(Some(key as i32)),
        Some(key) => Err(ApiError::bad_request(format!(
            "{name} must be a positive integer (got {key})"
        ))),
    }
}
