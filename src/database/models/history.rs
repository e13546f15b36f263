use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Immutable record of a property value at a point in time. Appended when a
/// value is first created and on every subsequent change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub id: i32,
    pub asset_id: String,
    pub property_id: i32,
    pub value: String,
    pub date: DateTime<Utc>,
}
