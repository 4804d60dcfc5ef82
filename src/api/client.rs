//! HTTP API Client
//!
//! reqwest implementation of [`Backend`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

use super::{
    join_url, paths, ApiError, Backend, CategoriesResponse, CategoryTotal, MerchantTotal,
    MerchantsResponse, SearchResponse, Timed,
};
use crate::config::ApiConfig;
use crate::state::UnlockStatus;

/// Workshop API client over reqwest
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and decode the body, whatever the HTTP status: the body's
    /// `error` field is what signals failure.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = join_url(&self.base_url, path);
        tracing::trace!(%url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "non-success status, decoding body anyway");
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn status(&self) -> Result<UnlockStatus, ApiError> {
        self.get_json(&paths::status()).await
    }

    async fn top_categories(&self, limit: usize) -> Result<Vec<CategoryTotal>, ApiError> {
        self.get_json::<CategoriesResponse>(&paths::top_categories(limit))
            .await?
            .into_items()
    }

    async fn category_merchants(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<MerchantTotal>, ApiError> {
        self.get_json::<MerchantsResponse>(&paths::category_merchants(category, limit))
            .await?
            .into_items()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Timed<SearchResponse>, ApiError> {
        let started = Instant::now();
        let value = self
            .get_json::<SearchResponse>(&paths::search(query, limit))
            .await?;

        Ok(Timed {
            value,
            roundtrip_ms: started.elapsed().as_millis() as u64,
        })
    }
}
