//! HTTP access to the remote photo service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::IgnoredAny;
use shared::{
    domain::Photo,
    protocol::{PhotoCountQuery, PhotoPageQuery},
};

use crate::error::FetchError;

/// Read-only view of the photo service used by the controller.
#[async_trait]
pub trait PhotoApi: Send + Sync {
    async fn fetch_page(&self, query: &PhotoPageQuery) -> Result<Vec<Photo>, FetchError>;
    async fn count_matches(&self, query: &PhotoCountQuery) -> Result<u64, FetchError>;
}

pub struct HttpPhotoApi {
    http: Client,
    base_url: String,
}

impl HttpPhotoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn photos_url(&self) -> String {
        format!("{}/photos", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, FetchError> {
        request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

#[async_trait]
impl PhotoApi for HttpPhotoApi {
    async fn fetch_page(&self, query: &PhotoPageQuery) -> Result<Vec<Photo>, FetchError> {
        let response = Self::send(self.http.get(self.photos_url()).query(query)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::PageStatus {
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    async fn count_matches(&self, query: &PhotoCountQuery) -> Result<u64, FetchError> {
        let response = Self::send(self.http.get(self.photos_url()).query(query)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::CountStatus {
                status: status.as_u16(),
            });
        }
        // Only the length matters, so elements are skipped rather than decoded.
        let matches: Vec<IgnoredAny> = response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(matches.len() as u64)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
