use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::FeedSource;
use crate::config::EpgConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};

/// Downloads the raw payload of a feed source
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> SourceResult<Bytes>;
}

/// reqwest-backed fetcher with a bounded total timeout per request
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration, connect_timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &EpgConfig) -> AppResult<Self> {
        Self::new(
            config.fetch_timeout,
            config.connect_timeout,
            &config.user_agent(),
        )
    }

    fn map_error(source: &FeedSource, error: reqwest::Error) -> SourceError {
        let url = source.display_url();
        if error.is_timeout() {
            SourceError::Timeout { url }
        } else {
            SourceError::fetch(url, error.to_string())
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> SourceResult<Bytes> {
        debug!("Fetching guide feed {}", source);

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| Self::map_error(source, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                url: source.display_url(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(source, e))?;

        debug!("Fetched {} bytes from {}", body.len(), source);
        Ok(body)
    }
}
