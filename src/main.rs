// src/main.rs
mod config;
mod models;
mod handlers;
mod clients;
mod poller;
mod utils;
#[cfg(test)]
mod testing;

use actix_web::{ web, App, HttpServer };
use env_logger::Env;
use governor::RateLimiter;
use crate::config::Config;
use crate::handlers::fetch::{ CycleLock, TriggerRateLimiter };
use log::{ info, warn };

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Pick up a local .env before reading configuration
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // Report early; the trigger endpoint refuses to run until this is fixed
    if let Err(e) = config.poller_settings() {
        warn!("Fetch cycles will fail until configured: {}", e);
    }

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to build HTTP client: {}", e)
            )
        })?;

    let bind = format!("{}:{}", config.bind_address, config.port);

    let trigger_rate_limiter: web::Data<TriggerRateLimiter> = web::Data::new(
        RateLimiter::direct(config.trigger_quota())
    );
    let cycle_lock = web::Data::new(CycleLock::new(()));
    let http = web::Data::new(http);
    let config = web::Data::new(config);

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(http.clone())
            .app_data(trigger_rate_limiter.clone())
            .app_data(cycle_lock.clone())
            .route("/", web::get().to(handlers::index::index))
            .route("/api/server-fetch", web::get().to(handlers::fetch::server_fetch))
    })
        .bind(&bind)?
        .run().await
}
