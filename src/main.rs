use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod overtime;
mod routes;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::error::ApiError;
use crate::overtime::OvertimeCalculator;
use crate::routes::Limiters;
use crate::store::{AttendanceStore, MySqlAttendanceStore};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        addr = %config.server_addr,
        timezone = %config.operating_timezone,
        "Server starting..."
    );

    let pool = init_db(&config.database_url)
        .await
        .context("failed to initialise database")?;

    let store: Arc<dyn AttendanceStore> = Arc::new(MySqlAttendanceStore::new(pool.clone()));
    let store = Data::from(store);
    let calculator = Data::new(OvertimeCalculator::new(config.operating_timezone));
    let limiters = Limiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the JS/CSS assets match too
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::BadRequest(format!("Invalid request body: {err}")).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::BadRequest(format!("Invalid query: {err}")).into()
            }))
            .app_data(Data::new(pool.clone()))
            .app_data(config_data.clone())
            .app_data(store.clone())
            .app_data(calculator.clone())
            .configure(|cfg| routes::configure(cfg, &config_data, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
