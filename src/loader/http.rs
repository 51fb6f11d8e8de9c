use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::feed::FeedSnapshot;

use super::FeedSource;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .timeout(TOTAL_TIMEOUT)
            .user_agent(concat!("fclite/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not create an HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    #[instrument(level = "DEBUG", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FeedSnapshot, FetchError> {
        let url = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.into(),
            reason: e.to_string(),
        })?;

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(len = body.len(), "Received the feed body");

        Ok(serde_json::from_str(&body)?)
    }
}
