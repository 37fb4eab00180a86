use sea_orm::ConnectOptions;
use sea_orm::{Database, DatabaseConnection};
use std::time::Duration;
use tracing::{info, instrument};

use crate::configuration::Settings;

#[instrument(skip_all)]
pub async fn init_db(settings: &Settings) -> anyhow::Result<DatabaseConnection> {
    info!("configuring database connection pool");

    let mut options = ConnectOptions::new(settings.database_url.clone());
    options
        .max_connections(10)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("database connection established");

    Ok(db)
}
