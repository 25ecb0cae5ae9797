//! The seeding sequence: authenticate, synchronize, insert, close.

use db_infra::config::db::DbSettings;
use tracing::{error, info};

use crate::adapters::students_sea::StudentCreate;
use crate::db::connection::with_connection;
use crate::entities::Student;
use crate::error::AppError;
use crate::infra::schema_sync::sync_schema;
use crate::repos::students;

/// Run the whole sequence against `settings` and return the created row.
///
/// Nothing is inserted unless the connection authenticates and the schema
/// synchronizes. The connection is closed before returning, on success or failure.
pub async fn run(settings: &DbSettings, student: StudentCreate) -> Result<Student, AppError> {
    with_connection(settings, |conn| {
        Box::pin(async move {
            conn.authenticate().await?;
            info!("Connection has been established successfully.");

            sync_schema(conn).await?;
            info!("Database synchronized successfully.");

            let db = conn.db()?;
            let created = students::create_student(db, student).await?;
            let json = serde_json::to_string(&created).unwrap_or_else(|_| format!("{created:?}"));
            info!("Student created: {json}");

            let stored = students::find_student_by_id(db, created.id).await?;
            let total = students::count_students(db).await?;
            info!(
                student_id = created.id,
                read_back = stored.is_some(),
                total,
                "seed=done table=students"
            );

            Ok(created)
        })
    })
    .await
}

/// Like [`run`], but every failure is reported once at `error` level instead of returned.
pub async fn run_logged(settings: &DbSettings, student: StudentCreate) {
    if let Err(e) = run(settings, student).await {
        log_failure(&e);
    }
}

/// Load `.env`, read settings from the environment and seed the literal record.
///
/// Configuration failures are logged the same way as connection or insert failures.
pub async fn run_from_env() {
    dotenvy::dotenv().ok();
    match DbSettings::from_env() {
        Ok(settings) => run_logged(&settings, StudentCreate::john_doe()).await,
        Err(e) => log_failure(&AppError::from(e)),
    }
}

fn log_failure(e: &AppError) {
    error!(code = e.code(), "Unable to connect to the database: {e}");
}
