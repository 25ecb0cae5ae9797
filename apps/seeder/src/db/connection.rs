use std::future::Future;
use std::pin::Pin;

use db_infra::config::db::{DbKind, DbSettings};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};

use crate::error::AppError;

/// The one connection a seeding run works with.
///
/// Once closed the handle stays closed: every later operation fails with
/// `AppError::Connection` instead of reconnecting.
pub struct Connection {
    inner: Option<DatabaseConnection>,
    kind: DbKind,
}

impl Connection {
    /// Open a single connection for `settings`.
    pub async fn open(settings: &DbSettings) -> Result<Self, AppError> {
        let db = db_infra::connect(settings).await?;
        Ok(Self {
            inner: Some(db),
            kind: settings.kind,
        })
    }

    /// Verify the server is reachable and accepts our credentials.
    pub async fn authenticate(&self) -> Result<(), AppError> {
        self.db()?
            .ping()
            .await
            .map_err(|e| AppError::connection(format!("authentication failed: {e}")))
    }

    /// Borrow the live connection.
    pub fn db(&self) -> Result<&DatabaseConnection, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::connection("connection is closed"))
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Release the connection. Closing an already closed handle is a no-op.
    pub async fn close(&mut self) -> Result<(), AppError> {
        match self.inner.take() {
            Some(db) => {
                db.close()
                    .await
                    .map_err(|e| AppError::connection(format!("failed to close connection: {e}")))?;
                info!(db_kind = %self.kind, "Connection closed");
                Ok(())
            }
            None => {
                debug!(db_kind = %self.kind, "close called on closed connection");
                Ok(())
            }
        }
    }
}

/// Boxed future borrowing the connection for `'c`.
pub type ConnFuture<'c, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + 'c>>;

/// Open a connection, run `f` with it and close it on every exit path.
///
/// The error from `f` takes precedence over a failure to close.
pub async fn with_connection<R, F>(settings: &DbSettings, f: F) -> Result<R, AppError>
where
    F: for<'c> FnOnce(&'c Connection) -> ConnFuture<'c, R>,
{
    let mut conn = Connection::open(settings).await?;
    let out = f(&conn).await;

    match (out, conn.close().await) {
        (Ok(val), Ok(())) => Ok(val),
        (Ok(val), Err(close_err)) => {
            warn!(error = %close_err, "Failed to close connection after success");
            Ok(val)
        }
        (Err(err), close_result) => {
            if let Err(close_err) = close_result {
                warn!(error = %close_err, "Failed to close connection after error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Statement};

    use super::*;

    #[tokio::test]
    async fn open_authenticate_close() {
        let mut conn = Connection::open(&DbSettings::sqlite_memory()).await.unwrap();

        conn.authenticate().await.unwrap();
        assert!(!conn.is_closed());
        assert_eq!(conn.kind(), DbKind::SqliteMemory);

        conn.close().await.unwrap();
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn closed_handle_is_not_reused() {
        let mut conn = Connection::open(&DbSettings::sqlite_memory()).await.unwrap();
        conn.close().await.unwrap();

        let err = conn.authenticate().await.unwrap_err();
        assert!(matches!(err, AppError::Connection { .. }));
        assert!(matches!(conn.db(), Err(AppError::Connection { .. })));
    }

    #[tokio::test]
    async fn second_close_is_a_no_op() {
        let mut conn = Connection::open(&DbSettings::sqlite_memory()).await.unwrap();
        conn.close().await.unwrap();
        conn.close().await.unwrap();
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn with_connection_returns_closure_value() {
        let answer = with_connection(&DbSettings::sqlite_memory(), |conn| {
            Box::pin(async move {
                let db = conn.db()?;
                let row = db
                    .query_one(Statement::from_string(db.get_database_backend(), "SELECT 41 + 1 AS n"))
                    .await?
                    .ok_or_else(|| AppError::db("no row"))?;
                Ok(row.try_get::<i64>("", "n")?)
            })
        })
        .await
        .unwrap();

        assert_eq!(answer, 42);
    }

    #[tokio::test]
    async fn with_connection_keeps_the_closure_error() {
        let err = with_connection(&DbSettings::sqlite_memory(), |_conn| {
            Box::pin(async move { Err::<(), _>(AppError::validation("boom")) })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn with_connection_never_runs_closure_when_open_fails() {
        let settings = DbSettings::sqlite_file("/nonexistent-dir/for/sure/school.db");
        let mut ran = false;

        let result = with_connection(&settings, |_conn| {
            ran = true;
            Box::pin(async move { Ok(()) })
        })
        .await;

        assert!(matches!(result, Err(AppError::Connection { .. })));
        assert!(!ran);
    }
}
