//! Relayer HTTP Client - Standard Relayer API v2
//!
//! Wraps reqwest with a concurrency limit and retries with exponential
//! backoff, and implements the `OrderSource` port by walking the
//! paginated `/v2/orders` and `/v2/asset_pairs` listings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::types::{ApiOrder, Page};
use crate::domain::{OrderRecord, Product};
use crate::ports::relayer::OrderSource;

/// Configuration for the relayer client.
#[derive(Debug, Clone)]
pub struct RelayerClientConfig {
  /// Base URL, e.g. `https://api.radarrelay.com/0x`.
  pub base_url: String,
  /// Network id passed as `networkId`.
  pub network_id: u64,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
  /// Records requested per page.
  pub per_page: u64,
  /// Hard stop for pagination.
  pub max_pages: u64,
}

impl Default for RelayerClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:3000".to_string(),
      network_id: 1,
      timeout: Duration::from_secs(30),
      max_concurrent: 4,
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
      per_page: 100,
      max_pages: 50,
    }
  }
}

/// HTTP client for a Standard Relayer API v2 endpoint.
pub struct RelayerClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: RelayerClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl RelayerClient {
  /// Create a new relayer client.
  pub fn new(config: RelayerClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    Ok(Self {
      http,
      config,
      semaphore,
    })
  }

  /// Full URL for `path` with the network and pagination query.
  fn page_url(&self, path: &str, page: u64) -> String {
    format!(
      "{}{}?networkId={}&page={}&perPage={}",
      self.config.base_url.trim_end_matches('/'),
      path,
      self.config.network_id,
      page,
      self.config.per_page
    )
  }

  /// Execute a GET request with rate limiting and retries.
  async fn get(&self, url: &str) -> Result<Response> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .context("Semaphore closed")?;

    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
        sleep(delay).await;
      }

      match self.http.get(url).send().await {
        Ok(response) => match response.status() {
          StatusCode::OK => return Ok(response),
          StatusCode::TOO_MANY_REQUESTS => {
            warn!("Rate limited by relayer, backing off");
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(status = %status, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Relayer error {status}: {body}"));
          }
        },
        Err(e) => {
          warn!(error = %e, attempt, "Request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }

  /// Walk every page of a listing endpoint.
  async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for page_number in 1..=self.config.max_pages {
      let url = self.page_url(path, page_number);
      let page: Page<T> = self
        .get(&url)
        .await?
        .json()
        .await
        .with_context(|| format!("Failed to parse {path} page {page_number}"))?;

      let total = page.total;
      let more = page.has_more(records.len() as u64 + page.records.len() as u64);
      records.extend(page.records);

      debug!(path, page = page_number, collected = records.len(), total, "Page fetched");

      if !more {
        return Ok(records);
      }
    }

    warn!(
      path,
      max_pages = self.config.max_pages,
      collected = records.len(),
      "Pagination limit reached"
    );
    Ok(records)
  }
}

#[async_trait]
impl OrderSource for RelayerClient {
  #[instrument(skip(self))]
  async fn fetch_orders(&self) -> Result<Vec<OrderRecord>> {
    let raw: Vec<ApiOrder> = self.get_all("/v2/orders").await?;
    let received = raw.len();

    let records: Vec<OrderRecord> = raw.into_iter().filter_map(ApiOrder::into_record).collect();

    if records.len() < received {
      warn!(
        skipped = received - records.len(),
        "Relayer orders without orderHash skipped"
      );
    }

    Ok(records)
  }

  #[instrument(skip(self))]
  async fn fetch_products(&self) -> Result<Vec<Product>> {
    self.get_all("/v2/asset_pairs").await
  }

  async fn is_healthy(&self) -> bool {
    let url = self.page_url("/v2/asset_pairs", 1);
    self.get(&url).await.is_ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_url_includes_network_and_paging() {
    let client = RelayerClient::new(RelayerClientConfig {
      base_url: "https://relayer.example/".to_string(),
      network_id: 42,
      per_page: 20,
      ..Default::default()
    })
    .unwrap();

    assert_eq!(
      client.page_url("/v2/orders", 3),
      "https://relayer.example/v2/orders?networkId=42&page=3&perPage=20"
    );
  }

  #[tokio::test]
  async fn test_unreachable_relayer_fails_after_retries() {
    let client = RelayerClient::new(RelayerClientConfig {
      base_url: "http://127.0.0.1:1".to_string(),
      max_retries: 1,
      retry_base_delay: Duration::from_millis(1),
      ..Default::default()
    })
    .unwrap();

    assert!(!client.is_healthy().await);
    assert!(client.fetch_orders().await.is_err());
  }
}
