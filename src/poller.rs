// src/poller.rs
//! One fetch cycle: page through the public server list, keep the servers
//! at or below the occupancy threshold, then overwrite the stored id list.
use std::fmt;
use std::time::Duration;
use log::{ debug, error, info, warn };
use crate::clients::jsonbin::StoreError;
use crate::clients::roblox::FetchError;
use crate::models::server::{ ServerPage, ServerRecord };

pub trait ServerSource {
    async fn fetch_page(&self, cursor: &str) -> Result<ServerPage, FetchError>;
}

pub trait DocumentStore {
    async fn overwrite(&self, ids: &[String]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Consecutive failed page fetches tolerated before the cycle aborts.
    pub max_retries: u32,
    pub rate_limit_delay: Duration,
    pub error_delay: Duration,
    /// Pause between two successful pages.
    pub page_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            rate_limit_delay: Duration::from_secs(15),
            error_delay: Duration::from_secs(2),
            page_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub suitable: usize,
    pub pages: usize,
}

#[derive(Debug, PartialEq)]
pub enum CycleError {
    RetriesExhausted { attempts: u32, last: FetchError },
    Store(StoreError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts, last } => write!(
                f,
                "Maximum retry limit reached while fetching servers ({} attempts, last error: {})",
                attempts, last
            ),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<StoreError> for CycleError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

enum FetchState {
    Fetching,
    Backoff(Duration),
    Exhausted(FetchError),
    Done,
}

struct Collected {
    suitable: Vec<ServerRecord>,
    pages: usize,
}

/// Runs a full cycle. The store is written exactly once, and only after
/// pagination finished; an aborted pagination leaves it untouched.
pub async fn run_cycle<S, D>(
    source: &S,
    store: &D,
    max_players: u32,
    policy: &RetryPolicy,
) -> Result<CycleReport, CycleError>
where
    S: ServerSource,
    D: DocumentStore,
{
    info!("Starting fetch cycle (max players: {})", max_players);
    let collected = collect_suitable(source, max_players, policy).await?;
    info!(
        "Finished fetching {} server pages. Found {} total suitable servers.",
        collected.pages,
        collected.suitable.len()
    );

    let ids: Vec<String> = collected.suitable.into_iter().filter_map(|server| server.id).collect();
    if ids.is_empty() {
        info!("No suitable servers found in this cycle.");
    }
    store.overwrite(&ids).await?;

    Ok(CycleReport { suitable: ids.len(), pages: collected.pages })
}

async fn collect_suitable<S: ServerSource>(
    source: &S,
    max_players: u32,
    policy: &RetryPolicy,
) -> Result<Collected, CycleError> {
    let mut cursor = String::new();
    let mut retries: u32 = 0;
    let mut collected = Collected { suitable: Vec::new(), pages: 0 };
    let mut state = FetchState::Fetching;

    loop {
        state = match state {
            FetchState::Fetching => {
                debug!(
                    "Fetching server page (cursor: {})",
                    if cursor.is_empty() { "none" } else { cursor.as_str() }
                );
                match source.fetch_page(&cursor).await {
                    Ok(page) => {
                        retries = 0;
                        collected.pages += 1;
                        if page.data.is_empty() {
                            FetchState::Done
                        } else {
                            let next = page.next_cursor().map(str::to_string);
                            collected.suitable.extend(
                                page.data.into_iter().filter(|s| s.is_suitable(max_players))
                            );
                            match next {
                                Some(next) => {
                                    cursor = next;
                                    FetchState::Backoff(policy.page_delay)
                                }
                                None => FetchState::Done,
                            }
                        }
                    }
                    Err(e) => {
                        retries += 1;
                        if retries >= policy.max_retries {
                            FetchState::Exhausted(e)
                        } else {
                            let delay = if e.is_rate_limited() {
                                policy.rate_limit_delay
                            } else {
                                policy.error_delay
                            };
                            warn!(
                                "{}. Waiting {:?} before retrying (retry {}/{})",
                                e, delay, retries, policy.max_retries
                            );
                            FetchState::Backoff(delay)
                        }
                    }
                }
            }
            FetchState::Backoff(delay) => {
                tokio::time::sleep(delay).await;
                FetchState::Fetching
            }
            FetchState::Exhausted(last) => {
                error!("Maximum retry limit reached after {} attempts. Aborting: {}", retries, last);
                return Err(CycleError::RetriesExhausted { attempts: retries, last });
            }
            FetchState::Done => return Ok(collected),
        };
    }
}
