use clap::{Parser, ValueEnum};
use db_infra::config::db::{DbKind, DbSettings, ENV_DIALECT};
use db_infra::orchestrate_migration;
use migration::MigrationCommand;

#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl From<Dialect> for DbKind {
    fn from(d: Dialect) -> Self {
        match d {
            Dialect::Mysql => DbKind::MySql,
            Dialect::Postgres => DbKind::Postgres,
            Dialect::Sqlite => DbKind::SqliteFile,
        }
    }
}

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Student schema migration tool")]
struct Args {
    /// Migration command to run: up | down | fresh | reset | refresh | status
    command: String,

    /// Override DB_DIALECT from the environment
    #[arg(short, long, value_enum)]
    dialect: Option<Dialect>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    let args = Args::parse();

    let Some(command) = MigrationCommand::parse(&args.command) else {
        eprintln!(
            "Unknown command: {}. Use: up | down | fresh | reset | refresh | status",
            args.command
        );
        std::process::exit(2);
    };

    dotenvy::dotenv().ok();
    let dialect_override = args.dialect.map(|d| DbKind::from(d).to_string());
    let settings = match DbSettings::from_lookup(|name| match (name, &dialect_override) {
        (ENV_DIALECT, Some(dialect)) => Some(dialect.clone()),
        _ => std::env::var(name).ok(),
    }) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = orchestrate_migration(&settings, command).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
