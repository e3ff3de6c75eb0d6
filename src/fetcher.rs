use crate::config::SourceConfig;
use crate::dto::{BetsPage, RawBetRecord};
use crate::error::{Result, SyncError};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const NONCE_HEADER: &str = "X-WP-Nonce";
const OUTPUT_MODE: &str = "flat";

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A page came back empty.
    Exhausted,
    /// A page came back with fewer rows than requested.
    ShortPage,
    /// HTTP 403 mid-run; rows gathered so far are kept.
    AuthorizationRejected { page: u32 },
}

impl Termination {
    /// The error behind an early stop, if any. Not fatal to the run.
    pub fn rejection(&self) -> Option<SyncError> {
        match *self {
            Termination::AuthorizationRejected { page } => {
                Some(SyncError::AuthorizationRejected { page })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub rows: Vec<RawBetRecord>,
    pub pages_requested: u32,
    pub termination: Termination,
}

enum PageResult {
    Rows(Vec<RawBetRecord>),
    Forbidden,
}

/// Walks the bets endpoint page by page with one nonce-bearing session.
pub struct PaginatedFetcher {
    client: Client,
    api_url: String,
    page_size: usize,
    page_delay: Duration,
}

impl PaginatedFetcher {
    pub fn new(source: &SourceConfig, nonce: &str) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&source.user_agent)
                .map_err(|e| SyncError::Config(format!("invalid user agent: {e}")))?,
        );
        headers.insert(
            NONCE_HEADER,
            HeaderValue::from_str(nonce)
                .map_err(|e| SyncError::InvalidNonce(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| SyncError::Config(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: source.api_url.clone(),
            page_size: source.page_size,
            page_delay: source.page_delay(),
        })
    }

    async fn fetch_page(&self, page: u32) -> Result<PageResult> {
        let params = [
            ("page", page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("mode", OUTPUT_MODE.to_string()),
            ("_", chrono::Utc::now().timestamp_millis().to_string()),
        ];

        let response = self
            .client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SyncError::SourceApi(format!("page {page}: {e}")))?;

        let status = response.status();
        debug!("API response status: {}", status);

        if status == StatusCode::FORBIDDEN {
            return Ok(PageResult::Forbidden);
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::SourceApi(format!("page {page}: {e}")))?;

        if !status.is_success() {
            return Err(SyncError::SourceApi(format!(
                "page {page} failed with status {status}: {body}"
            )));
        }

        let parsed: BetsPage = serde_json::from_str(&body)
            .map_err(|e| SyncError::SourceApi(format!("page {page} returned malformed JSON: {e}")))?;
        Ok(PageResult::Rows(parsed.rows))
    }

    /// Fetch every page until the source runs dry.
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let mut page: u32 = 1;
        let mut all_rows = Vec::new();

        let termination = loop {
            info!("Fetching page {}...", page);

            let rows = match self.fetch_page(page).await? {
                PageResult::Rows(rows) => rows,
                PageResult::Forbidden => {
                    let termination = Termination::AuthorizationRejected { page };
                    if let Some(cause) = termination.rejection() {
                        warn!("{}: security check failed, keeping {} rows", cause, all_rows.len());
                    }
                    break termination;
                }
            };

            if rows.is_empty() {
                break Termination::Exhausted;
            }

            let count = rows.len();
            info!("  + Got {} bets.", count);
            all_rows.extend(rows);

            if count < self.page_size {
                break Termination::ShortPage;
            }

            page += 1;
            sleep(self.page_delay).await;
        };

        Ok(FetchOutcome {
            rows: all_rows,
            pages_requested: page,
            termination,
        })
    }
}
