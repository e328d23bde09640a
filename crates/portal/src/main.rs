mod access;
mod auth;
mod handlers;
mod uploads;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router, Server};
use common::{config::Config, logging};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new()?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    tokio::fs::create_dir_all(&config.storage.uploads_path).await?;

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);
    let server = Server::bind(&server_config.address);

    info!(address = %server_config.address, "starting server");
    let config = Arc::new(config);

    server
        .serve(app_router(database, config).into_make_service())
        .await?;

    Ok(())
}

fn app_router(database: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::courses::routes(database.clone()))
        .merge(handlers::classes::routes(database.clone()))
        .merge(handlers::materials::routes(database.clone()))
        .merge(handlers::assignments::routes(database.clone()))
        .merge(handlers::submissions::routes(database.clone()))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_size))
        .layer(Extension(config))
        .with_state(database)
}
