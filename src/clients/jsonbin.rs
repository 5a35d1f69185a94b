// src/clients/jsonbin.rs
use std::fmt;
use log::info;
use crate::poller::DocumentStore;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Rejected { status: u16, body: String },
    Transport(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, body } => write!(f, "JSONBin API Error: {} - {}", status, body),
            Self::Transport(e) => write!(f, "Request to JSONBin failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Replaces the whole content of one JSONBin bin.
pub struct JsonBinClient {
    http: reqwest::Client,
    bin_url: String,
    bin_id: String,
    master_key: String,
}

impl JsonBinClient {
    pub fn new(http: reqwest::Client, api_base: &str, bin_id: &str, master_key: &str) -> Self {
        Self {
            http,
            bin_url: format!("{}/v3/b/{}", api_base.trim_end_matches('/'), bin_id),
            bin_id: bin_id.to_string(),
            master_key: master_key.to_string(),
        }
    }
}

impl DocumentStore for JsonBinClient {
    async fn overwrite(&self, ids: &[String]) -> Result<(), StoreError> {
        info!("Updating JSONBin bin {} with {} ids", self.bin_id, ids.len());
        let response = self.http
            .put(&self.bin_url)
            .header("X-Master-Key", &self.master_key)
            .json(ids)
            .send().await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected { status: status.as_u16(), body });
        }

        info!("Successfully updated JSONBin bin {}", self.bin_id);
        Ok(())
    }
}
