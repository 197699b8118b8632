use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use subscription_service::{handlers, openapi, SubscriptionService, SERVICE_NAME};
use subtrack_config::AppConfig;
use subtrack_database::Database;
use subtrack_observability::{error, info, init_tracing, observability, TracingConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration comes first: the log profile is part of it
    let config = AppConfig::from_env()?;

    init_tracing(TracingConfig::for_profile(SERVICE_NAME, &config.server.log_level));
    info!(profile = %config.server.log_level, "Configuration loaded");

    info!(dsn = %config.database.redacted_connection_string(), "Connecting to database...");
    let db = Database::connect(&config.database).await.map_err(|e| {
        error!(error = %e, "Database connection failed");
        e
    })?;

    if config.database.run_migrations {
        db.migrate().await?;
    } else {
        info!("Skipping database migrations");
    }

    let service = SubscriptionService::new(Arc::new(db.subscriptions()));
    let service_data = web::Data::new(service);
    let db_data = web::Data::new(db);

    let bind = (config.server.host.clone(), config.server.port);
    info!(host = %bind.0, port = bind.1, "Starting {}", SERVICE_NAME);
    info!("Swagger UI available at http://{}:{}/swagger/", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(service_data.clone())
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(observability(SERVICE_NAME))
            .route("/health", web::get().to(health_check))
            .configure(handlers::configure_subscription_routes)
            .configure(openapi::configure_swagger)
    })
    .bind(bind)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn health_check(db: web::Data<Database>) -> actix_web::Result<web::Json<serde_json::Value>> {
    let db_status = match db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            error!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Ok(web::Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "database": db_status,
        "timestamp": chrono::Utc::now()
    })))
}
