use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked real-world entity. Ids are supplied by the field workflow, not
/// generated here; location is absent until the first import sets it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: String,
    pub asset_type_id: i32,
    pub project_id: Option<i32>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Extent of a set of asset locations, used by the map to frame its view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoundingBox {
    pub latitude_min: Option<f64>,
    pub latitude_max: Option<f64>,
    pub longitude_min: Option<f64>,
    pub longitude_max: Option<f64>,
}
