use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named, typed attribute declared by an asset type. The `required` and
/// `is_private` flags drive import validation and map visibility.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i32,
    pub asset_type_id: i32,
    pub name: String,
    pub data_type: String,
    pub required: bool,
    pub is_private: bool,
}
