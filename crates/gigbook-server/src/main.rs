use gigbook_migration::MigratorTrait;
use gigbook_server::{AppState, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    gigbook_server::logging::init(&config);

    // Database connection
    let db_config = gigbook_db::DatabaseConfig::from_env();
    tracing::info!("connecting to database...");
    let db = gigbook_db::connect(&db_config)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("running database migrations...");
    gigbook_migration::Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    tracing::info!("migrations complete");

    let state = Arc::new(AppState::new(db));
    let app = gigbook_server::app(state);

    tracing::info!(addr = %config.bind, debug = config.debug, "server started");

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
