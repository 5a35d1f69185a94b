// src/clients/roblox.rs
use std::fmt;
use log::debug;
use reqwest::StatusCode;
use crate::models::server::ServerPage;
use crate::poller::ServerSource;

const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    RateLimited,
    Status(u16),
    Transport(String),
    Decode(String),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "Roblox API rate limited the request (429)"),
            Self::Status(status) => write!(f, "Roblox API returned status {}", status),
            Self::Transport(e) => write!(f, "Request to Roblox API failed: {}", e),
            Self::Decode(e) => write!(f, "Invalid server page from Roblox API: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

/// Reads the public server listing of one place.
pub struct RobloxClient {
    http: reqwest::Client,
    servers_url: String,
    cookie: String,
}

impl RobloxClient {
    pub fn new(http: reqwest::Client, api_base: &str, place_id: &str, cookie: &str) -> Self {
        Self {
            http,
            servers_url: format!(
                "{}/v1/games/{}/servers/Public",
                api_base.trim_end_matches('/'),
                place_id
            ),
            cookie: format!(".ROBLOSECURITY={}", cookie),
        }
    }
}

impl ServerSource for RobloxClient {
    async fn fetch_page(&self, cursor: &str) -> Result<ServerPage, FetchError> {
        let limit = PAGE_LIMIT.to_string();
        let response = self.http
            .get(&self.servers_url)
            .query(&[("limit", limit.as_str()), ("cursor", cursor)])
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::COOKIE, &self.cookie)
            .send().await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Roblox API answered {} for cursor {:?}", status, cursor);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<ServerPage>().await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
