// Shared setup for the HTTP integration tests.

use std::sync::Arc;

use actix_web::web::Data;
use civic_connect::auth::{AuthGateway, DbAuthGateway, JwtUtils};
use civic_connect::migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-memory SQLite with migrations applied. One connection so every
/// query sees the same database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub struct TestState {
    pub db: Data<DatabaseConnection>,
    pub jwt: Data<JwtUtils>,
    pub gateway: Data<dyn AuthGateway>,
}

pub async fn test_state() -> TestState {
    let db = Arc::new(setup_test_db().await);
    let jwt = JwtUtils::new(TEST_SECRET);
    let gateway: Arc<dyn AuthGateway> =
        Arc::new(DbAuthGateway::new(db.clone(), jwt.clone()).with_hash_cost(4));

    TestState {
        db: Data::from(db),
        jwt: Data::new(jwt),
        gateway: Data::from(gateway),
    }
}

/// Builds an actix test service with all routes and shared state.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.db.clone())
                .app_data($state.jwt.clone())
                .app_data($state.gateway.clone())
                .configure(civic_connect::api::configure),
        )
        .await
    };
}
