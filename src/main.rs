use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use civic_connect::api::{self, ApiDoc};
use civic_connect::auth::{AuthGateway, DbAuthGateway, JwtUtils};
use civic_connect::configuration::get_configuration;
use civic_connect::db::init_db;
use civic_connect::migration::{Migrator, MigratorTrait};
use civic_connect::telemetry::{get_subscriber, init_subscriber};
use sea_orm::DatabaseConnection;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = get_configuration()?;

    let subscriber = get_subscriber(
        "civic_connect".into(),
        settings.log_filter.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber)?;

    info!("starting civic_connect");

    let db = Arc::new(init_db(&settings).await?);
    info!("running database migrations");
    Migrator::up(db.as_ref(), None).await?;
    info!("migrations complete");

    let jwt = JwtUtils::new(settings.jwt_secret.clone());
    let gateway: Arc<dyn AuthGateway> = Arc::new(DbAuthGateway::new(db.clone(), jwt.clone()));

    let db_data: Data<DatabaseConnection> = Data::from(db);
    let jwt_data = Data::new(jwt);
    let gateway_data: Data<dyn AuthGateway> = Data::from(gateway);
    let allowed_origin = settings.allowed_origin.clone();

    info!(host = %settings.host, port = settings.port, "server listening");
    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default().allowed_origin(origin).supports_credentials(),
            None => Cors::default().allow_any_origin(),
        }
        .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(jwt_data.clone())
            .app_data(gateway_data.clone())
            .configure(api::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
