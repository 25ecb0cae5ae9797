//! SeaORM -> AppError translation.
//!
//! Every adapter error passes through `map_db_err` so callers see one of the
//! seeder's categories instead of driver-specific messages.

use sea_orm::DbErr;
use tracing::warn;

use crate::error::AppError;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// NOT NULL violations as worded by SQLite, PostgreSQL and MySQL.
fn is_not_null_violation(msg: &str) -> bool {
    msg.contains("NOT NULL constraint failed")
        || msg.contains("violates not-null constraint")
        || mentions_sqlstate(msg, "23502")
        || msg.contains("cannot be null")
        || msg.contains("doesn't have a default value")
}

/// Driver errors that mean the link to the server is gone or unusable.
fn is_link_failure(msg: &str) -> bool {
    msg.contains("error communicating with database")
        || msg.contains("closed pool")
        || msg.contains("pool timed out")
        || msg.contains("Connection refused")
}

/// Translate a `DbErr` into an `AppError`.
pub fn map_db_err(e: DbErr) -> AppError {
    let error_msg = e.to_string();

    match &e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return AppError::connection(error_msg);
        }
        DbErr::RecordNotInserted => {
            return AppError::db("Record was not inserted");
        }
        _ => {}
    }

    if is_not_null_violation(&error_msg) {
        warn!(raw_error = %error_msg, "Required field missing");
        return AppError::validation(error_msg);
    }

    if is_link_failure(&error_msg) {
        warn!(raw_error = %error_msg, "Database link failed mid-operation");
        return AppError::connection(error_msg);
    }

    AppError::db(error_msg)
}

#[cfg(test)]
mod tests {
    use sea_orm::RuntimeErr;

    use super::*;

    fn exec(msg: &str) -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(msg.to_string()))
    }

    #[test]
    fn not_null_violations_are_validation_errors() {
        for msg in [
            "error returned from database: (code: 1299) NOT NULL constraint failed: students.name",
            "null value in column \"age\" of relation \"students\" violates not-null constraint",
            "error returned from database: 1048 (23000): Column 'name' cannot be null",
            "error returned from database: 1364 (HY000): Field 'age' doesn't have a default value",
        ] {
            assert!(
                matches!(map_db_err(exec(msg)), AppError::Validation { .. }),
                "expected validation for: {msg}"
            );
        }
    }

    #[test]
    fn link_failures_are_connection_errors() {
        let err = map_db_err(exec("error communicating with database: broken pipe"));
        assert!(matches!(err, AppError::Connection { .. }));

        let err = map_db_err(DbErr::Conn(RuntimeErr::Internal("refused".into())));
        assert!(matches!(err, AppError::Connection { .. }));
    }

    #[test]
    fn anything_else_is_a_db_error() {
        let err = map_db_err(exec("syntax error near FROM"));
        assert!(matches!(err, AppError::Db { .. }));
        assert_eq!(map_db_err(DbErr::RecordNotInserted).code(), "DB_ERROR");
    }
}
