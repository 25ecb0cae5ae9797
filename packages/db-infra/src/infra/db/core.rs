use std::future::Future;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{error, info, warn};

use crate::config::db::{DbKind, DbSettings};
use crate::error::DbInfraError;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        DbInfraError::connect("no connection attempt was made (max_attempts is 0)")
    }))
}

/// Single-connection options for `settings`; driver timeouts are left at their defaults.
fn connect_options(settings: &DbSettings) -> Result<ConnectOptions, DbInfraError> {
    let url = settings.url()?;
    let mut opt = ConnectOptions::new(url);
    opt.min_connections(1).max_connections(1).sqlx_logging(true);
    Ok(opt)
}

/// Open exactly one connection to the configured database. No retries.
pub async fn connect(settings: &DbSettings) -> Result<DatabaseConnection, DbInfraError> {
    let opt = connect_options(settings)?;
    info!(
        db_kind = %settings.kind,
        url = %settings.redacted_url(),
        "db=connect"
    );

    Database::connect(opt).await.map_err(|e| {
        DbInfraError::connect(format!(
            "failed to connect to {} ({}): {}",
            settings.kind,
            settings.redacted_url(),
            e
        ))
    })
}

/// Connection used by the migration CLI. Server dialects get a few
/// attempts so the CLI can be started alongside a booting database.
pub async fn build_admin_pool(settings: &DbSettings) -> Result<DatabaseConnection, DbInfraError> {
    if settings.kind.is_server() {
        retry_connection(|| connect(settings), 5, 500).await
    } else {
        connect(settings).await
    }
}

pub async fn orchestrate_migration(
    settings: &DbSettings,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    if settings.kind == DbKind::SqliteMemory {
        return Err(DbInfraError::config(
            "in-memory SQLite is discarded when the command exits; use sqlite with a file path",
        ));
    }

    let admin_pool = build_admin_pool(settings).await?;
    let result = orchestrate_migration_internal(&admin_pool, settings, command).await;

    if let Err(e) = admin_pool.close().await {
        warn!(error = %e, "Failed to close migration connection");
    }
    result
}

pub async fn orchestrate_migration_internal(
    pool: &DatabaseConnection,
    settings: &DbSettings,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let start = Instant::now();
    info!(
        "migrate=start db_kind={} url={} command={:?}",
        settings.kind,
        settings.redacted_url(),
        command
    );

    if let Err(e) = migrate(pool, command).await {
        error!("migrate=failed err={}", e);
        return Err(DbInfraError::config(format!(
            "migration execution failed: {e}"
        )));
    }

    if matches!(command, MigrationCommand::Status) {
        info!("migrate=done");
        return Ok(());
    }

    let expected_count = Migrator::migrations().len();
    let applied_count = migration::count_applied_migrations(pool)
        .await
        .unwrap_or(0);
    info!(
        migrate = "counts",
        expected_count = expected_count,
        applied_count = applied_count,
        elapsed_ms = start.elapsed().as_millis()
    );

    match command {
        MigrationCommand::Reset if applied_count != 0 => {
            return Err(DbInfraError::config(format!(
                "Migration verification failed: reset should leave 0 migrations applied, but {applied_count} were found (db_kind={})",
                settings.kind
            )));
        }
        MigrationCommand::Up | MigrationCommand::Fresh | MigrationCommand::Refresh
            if applied_count != expected_count =>
        {
            return Err(DbInfraError::config(format!(
                "Migration verification failed: expected {expected_count} migrations, but {applied_count} were applied (db_kind={})",
                settings.kind
            )));
        }
        _ => {}
    }

    info!("migrate=done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retry_connection_returns_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry_connection(
            || {
                calls += 1;
                let n = calls;
                async move { Err(DbInfraError::connect(format!("attempt {n}"))) }
            },
            3,
            1,
        )
        .await;

        assert_eq!(calls, 3);
        assert!(result.unwrap_err().to_string().contains("attempt 3"));
    }

    #[tokio::test]
    async fn test_retry_connection_stops_on_success() {
        let mut calls = 0;
        let result = retry_connection(
            || {
                calls += 1;
                let n = calls;
                async move {
                    if n < 2 {
                        Err(DbInfraError::connect("not yet"))
                    } else {
                        Ok(n)
                    }
                }
            },
            5,
            1,
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_connect_fails_for_unreachable_sqlite_path() {
        let settings = DbSettings::sqlite_file("/nonexistent-dir/for/sure/school.db");
        let err = connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbInfraError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_orchestrate_migration_rejects_memory_sqlite() {
        let err = orchestrate_migration(&DbSettings::sqlite_memory(), MigrationCommand::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, DbInfraError::Config { .. }));
    }

    #[tokio::test]
    async fn test_orchestrate_migration_up_then_reset_on_sqlite_memory_pool() {
        let settings = DbSettings::sqlite_memory();
        let pool = connect(&settings).await.unwrap();

        orchestrate_migration_internal(&pool, &settings, MigrationCommand::Up)
            .await
            .unwrap();
        assert_eq!(migration::count_applied_migrations(&pool).await.unwrap(), 1);

        orchestrate_migration_internal(&pool, &settings, MigrationCommand::Reset)
            .await
            .unwrap();
        assert_eq!(migration::count_applied_migrations(&pool).await.unwrap(), 0);
    }
}
