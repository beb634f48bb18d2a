use std::collections::HashSet;
use std::time::Duration;

use librakeeper_core::error::AppError;
use librakeeper_core::models::BookListing;
use librakeeper_core::retry::{RetryBudget, RetryPolicy};
use librakeeper_core::traits::ListingFetcher;
use reqwest::Client;
use reqwest::header::{HeaderMap, PRAGMA};
use url::Url;

use crate::parser::{ResultsPage, parse_results_page};

pub const DEFAULT_BASE_URL: &str = "https://www.findbook.ru";

/// The aggregator serves a stripped page to unknown agents.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

const SEARCH_PATH: &str = "/search/d1";
const PAGE_SIZE: &str = "15";

#[derive(Debug, Clone)]
pub struct FindbookConfig {
    pub base_url: String,
    /// Bound on one whole search, all pages and retries included.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FindbookConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
        }
    }
}

impl FindbookConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Scrapes shop listings for an ISBN from findbook.ru.
///
/// Follows the pager until it runs out, retrying pages the aggregator marks
/// as rate-limited (`Pragma: no-cache`) within one shared retry budget.
#[derive(Clone)]
pub struct FindbookFetcher {
    client: Client,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
}

impl FindbookFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(FindbookConfig::default())
    }

    pub fn with_config(config: FindbookConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid findbook base URL '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    /// First results page for `isbn`.
    pub fn search_url(&self, isbn: &str) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| AppError::ConfigError(format!("Invalid search URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("isbn", isbn)
            .append_pair("r", "0")
            .append_pair("s", "1")
            .append_pair("viewsize", PAGE_SIZE)
            .append_pair("startidx", "0");
        Ok(url)
    }

    async fn crawl(&self, isbn: &str) -> Result<Vec<BookListing>, AppError> {
        let mut budget = self.retry.budget();
        let mut visited = HashSet::new();
        let mut listings = Vec::new();
        let mut next = Some(self.search_url(isbn)?);

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                tracing::debug!(%url, "Pager points back to a visited page, stopping");
                break;
            }

            let page = match self.fetch_page(&url, &mut budget).await {
                Ok(page) => page,
                Err(e) if visited.len() == 1 => return Err(e),
                Err(e) => {
                    tracing::warn!(%isbn, %url, error = %e, "Follow-up page failed, keeping partial results");
                    break;
                }
            };

            listings.extend(page.listings);
            next = page.next_page;
        }

        Ok(listings)
    }

    async fn fetch_page(&self, url: &Url, budget: &mut RetryBudget) -> Result<ResultsPage, AppError> {
        loop {
            tracing::info!(%url, "Visiting");

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::HttpError(format!(
                    "HTTP {} for {}",
                    status.as_u16(),
                    url
                )));
            }

            let rate_limited = is_rate_limited(response.headers());
            let html = response
                .text()
                .await
                .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

            if rate_limited {
                if budget.remaining() > 0 {
                    tracing::warn!(%url, retry = budget.used() + 1, "Rate limited, retrying");
                    budget.wait().await;
                    continue;
                }
                tracing::warn!(%url, "Rate limited and out of retries, using page as is");
            }

            return parse_results_page(&html, url);
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

impl ListingFetcher for FindbookFetcher {
    async fn fetch_listings(&self, isbn: &str) -> Result<Vec<BookListing>, AppError> {
        tokio::time::timeout(self.timeout, self.crawl(isbn))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
    }
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    headers
        .get(PRAGMA)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("no-cache"))
}
