mod config;
mod server;

use flexdb_axum::{AppEnv, AppState, DatabaseConfig, init, router};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    server::init_tracing("flexdb_server");

    let env = AppEnv::from_env();
    let db_config = DatabaseConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid database configuration");
    })?;
    let server_config = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid server configuration");
    })?;

    tracing::info!(
        environment = %env,
        database = db_config.kind(),
        port = server_config.port,
        "Starting flexdb server"
    );

    let db = init(&db_config, &env).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database");
    })?;
    tracing::info!("Database initialized");

    let app = router(AppState::new(db.clone(), env));
    tracing::info!(
        "Health check: http://localhost:{}/health",
        server_config.port
    );

    let served = server::serve(server_config.port, app).await;
    db.close().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
