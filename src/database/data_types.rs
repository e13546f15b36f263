use sqlx::PgExecutor;

use crate::database::models::DataType;
use crate::database::DatabaseError;

/// Data-type tags a property definition may be declared with, served to the
/// schema-authoring front-end.
pub async fn find(db: impl PgExecutor<'_>) -> Result<Vec<DataType>, DatabaseError> {
    let data_types = sqlx::query_as::<_, DataType>("SELECT id, name FROM data_type ORDER BY id")
        .fetch_all(db)
        .await?;

    Ok(data_types)
}
