use sea_orm::{
    ConnectionTrait, DatabaseBackend, EntityName, EntityTrait, IdenStatic, QuerySelect, Statement,
};

use crate::entities::students;
use crate::error::AppError;
use crate::infra::db_errors::map_db_err;

/// Schema guard - ensures the live `students` table can hold a Student.
///
/// Selects every mapped column with `LIMIT 0`, so a pre-existing table that
/// lacks a column fails here instead of on insert. Optional fields must also
/// be nullable in the live table.
pub async fn ensure_students_table<C: ConnectionTrait>(conn: &C) -> Result<(), AppError> {
    if let Err(e) = students::Entity::find().limit(0u64).all(conn).await {
        return Err(as_schema_error(e));
    }

    let column = students::Column::Class.as_str();
    if column_is_not_null(conn, students::Entity.table_name(), column).await? {
        return Err(AppError::schema(format!(
            "existing students table conflicts with the Student model: column '{column}' is NOT NULL but optional"
        )));
    }
    Ok(())
}

fn as_schema_error(e: sea_orm::DbErr) -> AppError {
    match map_db_err(e) {
        err @ AppError::Connection { .. } => err,
        other => AppError::schema(format!(
            "existing students table conflicts with the Student model: {other}"
        )),
    }
}

/// Whether `table.column` carries a NOT NULL constraint in the live database.
async fn column_is_not_null<C: ConnectionTrait>(
    conn: &C,
    table: &str,
    column: &str,
) -> Result<bool, AppError> {
    let backend = conn.get_database_backend();
    let stmt = match backend {
        DatabaseBackend::Sqlite => Statement::from_sql_and_values(
            backend,
            "SELECT CASE WHEN \"notnull\" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable \
             FROM pragma_table_info(?) WHERE name = ?",
            [table.into(), column.into()],
        ),
        DatabaseBackend::Postgres => Statement::from_sql_and_values(
            backend,
            "SELECT CAST(is_nullable AS TEXT) AS is_nullable FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
            [table.into(), column.into()],
        ),
        DatabaseBackend::MySql => Statement::from_sql_and_values(
            backend,
            "SELECT IS_NULLABLE AS is_nullable FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?",
            [table.into(), column.into()],
        ),
    };

    let row = conn.query_one(stmt).await.map_err(as_schema_error)?;
    match row {
        Some(row) => {
            let nullable: String = row.try_get("", "is_nullable").map_err(as_schema_error)?;
            Ok(nullable.eq_ignore_ascii_case("NO"))
        }
        None => Err(AppError::schema(format!(
            "existing students table conflicts with the Student model: column '{column}' not found"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use db_infra::config::db::DbSettings;

    use super::*;
    use crate::db::connection::Connection;

    async fn memory_with(create_sql: &str) -> Connection {
        let conn = Connection::open(&DbSettings::sqlite_memory()).await.unwrap();
        conn.db()
            .unwrap()
            .execute(Statement::from_string(DatabaseBackend::Sqlite, create_sql))
            .await
            .unwrap();
        conn
    }

    #[tokio::test]
    async fn accepts_matching_table() {
        let conn = memory_with(
            "CREATE TABLE students (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
             age INTEGER NOT NULL, class TEXT, created_at TEXT NOT NULL, updated_at TEXT NOT NULL)",
        )
        .await;

        ensure_students_table(conn.db().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_not_null_class() {
        let conn = memory_with(
            "CREATE TABLE students (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
             age INTEGER NOT NULL, class TEXT NOT NULL, created_at TEXT NOT NULL, updated_at TEXT NOT NULL)",
        )
        .await;

        let err = ensure_students_table(conn.db().unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }), "got {err:?}");
        assert!(err.to_string().contains("class"));
    }

    #[tokio::test]
    async fn rejects_missing_column() {
        let conn = memory_with("CREATE TABLE students (id INTEGER PRIMARY KEY, name TEXT)").await;

        let err = ensure_students_table(conn.db().unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }), "got {err:?}");
    }
}
