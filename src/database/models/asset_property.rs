use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Current value of one property on one asset. At most one row exists per
/// (asset_id, property_id) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetProperty {
    pub asset_id: String,
    pub property_id: i32,
    pub value: String,
}

/// Joined view of a non-private property value with its asset's location,
/// served to the map front-end.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssetPropertySummary {
    pub asset_id: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub property_id: i32,
    pub value: String,
}
