use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::DbInfraError;

pub const ENV_DIALECT: &str = "DB_DIALECT";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";

/// Characters left as-is inside URL userinfo and path segments (RFC 3986 unreserved).
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// SQLite file paths keep their separators; the driver percent-decodes the rest.
const SQLITE_PATH: &AsciiSet = &URL_COMPONENT.remove(b'/');

/// Database engine a connection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    MySql,
    Postgres,
    /// SQLite database stored in a file (path taken from `DB_NAME`)
    SqliteFile,
    /// SQLite database living only as long as its connection
    SqliteMemory,
}

impl DbKind {
    /// Whether this dialect talks to a server over the network.
    pub fn is_server(self) -> bool {
        matches!(self, DbKind::MySql | DbKind::Postgres)
    }

    /// Port the driver would use when none is configured.
    pub fn default_port(self) -> Option<u16> {
        match self {
            DbKind::MySql => Some(3306),
            DbKind::Postgres => Some(5432),
            DbKind::SqliteFile | DbKind::SqliteMemory => None,
        }
    }
}

impl Default for DbKind {
    fn default() -> Self {
        DbKind::MySql
    }
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DbKind::MySql),
            "postgres" | "postgresql" => Ok(DbKind::Postgres),
            "sqlite" | "sqlite-file" => Ok(DbKind::SqliteFile),
            "sqlite-memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!(
                "Unsupported dialect '{other}' in {ENV_DIALECT}; expected mysql, postgres, sqlite or sqlite-memory"
            ))),
        }
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DbKind::MySql => "mysql",
            DbKind::Postgres => "postgres",
            DbKind::SqliteFile => "sqlite",
            DbKind::SqliteMemory => "sqlite-memory",
        };
        f.write_str(s)
    }
}

impl From<DbKind> for sea_orm::DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::MySql => sea_orm::DatabaseBackend::MySql,
            DbKind::Postgres => sea_orm::DatabaseBackend::Postgres,
            DbKind::SqliteFile | DbKind::SqliteMemory => sea_orm::DatabaseBackend::Sqlite,
        }
    }
}

/// Connection parameters for the single database the tools talk to.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub kind: DbKind,
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl DbSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, DbInfraError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbInfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let kind = match var(ENV_DIALECT) {
            Some(dialect) => dialect.parse()?,
            None => DbKind::default(),
        };

        let port = match var(ENV_PORT) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                DbInfraError::config(format!("{ENV_PORT} must be a valid port number, got '{raw}'"))
            })?),
            None => None,
        };

        let settings = Self {
            kind,
            host: var(ENV_HOST).unwrap_or_else(|| "localhost".to_string()),
            port,
            user: var(ENV_USER),
            password: lookup(ENV_PASSWORD),
            database: var(ENV_NAME),
        };

        // Surface missing variables now rather than as a driver error later
        settings.url()?;
        Ok(settings)
    }

    /// Settings for a private in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self {
            kind: DbKind::SqliteMemory,
            host: String::new(),
            port: None,
            user: None,
            password: None,
            database: None,
        }
    }

    /// Settings for a SQLite database file, created on first connect.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self {
            kind: DbKind::SqliteFile,
            database: Some(path.into()),
            ..Self::sqlite_memory()
        }
    }

    /// Effective port: the configured one or the dialect default.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.kind.default_port())
    }

    /// Connection URL handed to the driver.
    pub fn url(&self) -> Result<String, DbInfraError> {
        self.render(false)
    }

    /// Connection URL with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        self.render(true)
            .unwrap_or_else(|_| format!("{}://<incomplete>", self.kind))
    }

    fn render(&self, mask_password: bool) -> Result<String, DbInfraError> {
        match self.kind {
            DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
            DbKind::SqliteFile => {
                let path = required(&self.database, ENV_NAME)?;
                let path = utf8_percent_encode(path, SQLITE_PATH);
                Ok(format!("sqlite://{path}?mode=rwc"))
            }
            DbKind::MySql | DbKind::Postgres => {
                let scheme = match self.kind {
                    DbKind::MySql => "mysql",
                    _ => "postgres",
                };
                let user = encode(required(&self.user, ENV_USER)?);
                let database = encode(required(&self.database, ENV_NAME)?);
                let auth = match self.password.as_deref() {
                    Some(p) if !p.is_empty() => {
                        let password = if mask_password {
                            "***".to_string()
                        } else {
                            encode(p)
                        };
                        format!("{user}:{password}")
                    }
                    _ => user,
                };
                let port = self
                    .effective_port()
                    .map(|p| format!(":{p}"))
                    .unwrap_or_default();
                Ok(format!("{scheme}://{auth}@{}{port}/{database}", self.host))
            }
        }
    }
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, DbInfraError> {
    value
        .as_deref()
        .ok_or_else(|| DbInfraError::config(format!("Required environment variable '{name}' is not set")))
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, URL_COMPONENT).to_string()
}
