// src/handlers/fetch.rs
use actix_web::{ web, HttpResponse };
use governor::clock::DefaultClock;
use governor::state::{ InMemoryState, NotKeyed };
use governor::RateLimiter;
use log::{ error, info };
use crate::clients::jsonbin::JsonBinClient;
use crate::clients::roblox::RobloxClient;
use crate::config::Config;
use crate::poller;
use crate::utils::RequestError;

pub type TriggerRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Held for the whole cycle so two triggers never race on the bin overwrite.
pub type CycleLock = tokio::sync::Mutex<()>;

pub async fn server_fetch(
    config: web::Data<Config>,
    http: web::Data<reqwest::Client>,
    rate_limiter: web::Data<TriggerRateLimiter>,
    cycle_lock: web::Data<CycleLock>,
) -> Result<HttpResponse, RequestError> {
    // Configuration failures always answer 500 and never spend trigger quota
    let settings = match config.poller_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Server configuration error: {}", e);
            return Err(e.into());
        }
    };

    if rate_limiter.check().is_err() {
        error!("Rate limit exceeded for fetch trigger");
        return Err(RequestError::RateLimitExceeded);
    }

    let _running = cycle_lock.lock().await;
    info!("Starting fetch cycle for place {}", settings.place_id);

    let source = RobloxClient::new(
        http.get_ref().clone(),
        &config.roblox_api_base,
        &settings.place_id,
        &settings.roblox_cookie,
    );
    let store = JsonBinClient::new(
        http.get_ref().clone(),
        &config.jsonbin_api_base,
        &settings.jsonbin_bin_id,
        &settings.jsonbin_api_key,
    );

    let report = match poller::run_cycle(&source, &store, settings.max_players, &config.retry_policy()).await {
        Ok(report) => report,
        Err(e) => {
            error!("An error occurred during the fetch cycle: {}", e);
            return Err(e.into());
        }
    };

    info!("Cycle complete: {} suitable servers over {} pages", report.suitable, report.pages);
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!(
            "Cycle complete. Found {} suitable servers and updated JSONBin.",
            report.suitable
        )))
}
