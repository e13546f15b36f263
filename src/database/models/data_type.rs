use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lookup row for the data-type tags a property definition may carry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataType {
    pub id: i32,
    pub name: String,
}
