use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::migrator::Migrator;

pub type DbPool = DatabaseConnection;

/// Connection pool settings.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            sqlx_logging: false,
        }
    }
}

/// Establishes a database connection pool with default settings.
#[instrument(skip(database_url))]
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    establish_connection_with_config(database_url, &DbConfig::default()).await
}

/// Establishes a database connection pool with explicit settings.
pub async fn establish_connection_with_config(
    database_url: &str,
    config: &DbConfig,
) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opts).await?;
    info!("Database connection established");
    Ok(db)
}

/// Establishes a connection pool sized from the application config.
pub async fn establish_connection_from_app_config(
    config: &AppConfig,
) -> Result<DatabaseConnection, DbErr> {
    let db_config = DbConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        sqlx_logging: config.is_development(),
        ..DbConfig::default()
    };
    establish_connection_with_config(&config.database_url, &db_config).await
}

/// Applies all pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations");
    Migrator::up(db, None).await?;
    info!("Database migrations complete");
    Ok(())
}

/// Verifies the connection is alive, used by the health endpoint.
pub async fn ping(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.ping().await
}
