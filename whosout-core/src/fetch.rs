//! Retrieval of the upstream calendar feed.

use async_trait::async_trait;

use crate::error::{WhosOutError, WhosOutResult};

/// Fetches the full body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> WhosOutResult<Vec<u8>>;
}

/// `Fetcher` backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> WhosOutResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WhosOutError::Fetch(format!("request to calendar feed failed: {e}")))?;

        // An error page must never replace good cached data.
        let response = response
            .error_for_status()
            .map_err(|e| WhosOutError::Fetch(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| WhosOutError::Fetch(format!("could not read calendar feed body: {e}")))?;

        Ok(body.to_vec())
    }
}
