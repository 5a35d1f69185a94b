// src/utils.rs
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{ HttpResponse, ResponseError };
use std::fmt;
use crate::config::ConfigError;
use crate::poller::CycleError;

#[derive(Debug)]
pub enum RequestError {
    RateLimitExceeded,
    Config(ConfigError),
    Cycle(CycleError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::Config(e) => write!(f, "Server configuration error: {}", e),
            Self::Cycle(e) => write!(f, "An error occurred: {}", e),
        }
    }
}

impl From<ConfigError> for RequestError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CycleError> for RequestError {
    fn from(e: CycleError) -> Self {
        Self::Cycle(e)
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Config(_) | Self::Cycle(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
