use sea_orm::{ConnectionTrait, Schema};
use tracing::info;

use crate::db::connection::Connection;
use crate::entities::students;
use crate::error::AppError;
use crate::infra::db_errors::map_db_err;
use crate::infra::schema_guard::ensure_students_table;

/// Create the `students` table if it is missing; an existing table is never altered.
///
/// The statement is derived from the entity, so migration bookkeeping tables
/// kept by other tools in the same database play no part.
pub async fn sync_schema(conn: &Connection) -> Result<(), AppError> {
    let db = conn.db()?;
    let backend = db.get_database_backend();

    let create = Schema::new(backend)
        .create_table_from_entity(students::Entity)
        .if_not_exists()
        .to_owned();

    db.execute(backend.build(&create))
        .await
        .map_err(|e| match map_db_err(e) {
            err @ AppError::Connection { .. } => err,
            other => AppError::schema(format!("schema synchronization failed: {other}")),
        })?;

    ensure_students_table(db).await?;
    info!(db_kind = %conn.kind(), "schema=synced table=students");
    Ok(())
}
