use db_infra::DbInfraError;
use thiserror::Error;

/// Failures of the seeding sequence.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Connection error: {detail}")]
    Connection { detail: String },
    #[error("Schema error: {detail}")]
    Schema { detail: String },
    #[error("Validation error: {detail}")]
    Validation { detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
}

impl AppError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        Self::Connection {
            detail: detail.into(),
        }
    }

    pub fn schema(detail: impl Into<String>) -> Self {
        Self::Schema {
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Connection { .. } => "CONNECTION_ERROR",
            AppError::Schema { .. } => "SCHEMA_ERROR",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Db { .. } => "DB_ERROR",
        }
    }
}

impl From<DbInfraError> for AppError {
    fn from(e: DbInfraError) -> Self {
        match e {
            DbInfraError::Config { message } => AppError::config(message),
            DbInfraError::Connect { message } => AppError::connection(message),
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infra_errors_keep_their_category() {
        let config: AppError = DbInfraError::config("DB_USER missing").into();
        assert!(matches!(config, AppError::Config { .. }));
        assert_eq!(config.code(), "CONFIG_ERROR");

        let connect: AppError = DbInfraError::connect("refused").into();
        assert!(matches!(connect, AppError::Connection { .. }));
        assert_eq!(connect.to_string(), "Connection error: refused");
    }
}
