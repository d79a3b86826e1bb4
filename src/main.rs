use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod notify;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::clock::{Clock, SystemClock};
use crate::docs::ApiDoc;
use crate::notify::EmailNotifier;
use crate::service::attendance::Attendance;
use crate::service::reset_token::ResetTokens;
use crate::store::attendance::MySqlAttendanceStore;
use crate::store::employees::MySqlEmployeeStore;
use crate::store::tokens::MySqlTokenStore;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    // Wire the lifecycle services once; handlers receive them as app data.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let reset_tokens = Data::new(ResetTokens::new(
        Arc::new(MySqlTokenStore::new(pool.clone())),
        clock.clone(),
        config.token_policy(),
    ));

    let attendance = Data::new(Attendance::new(
        Arc::new(MySqlEmployeeStore::new(pool.clone())),
        Arc::new(MySqlAttendanceStore::new(pool.clone())),
        clock,
        Arc::new(EmailNotifier),
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(reset_tokens.clone())
            .app_data(attendance.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
