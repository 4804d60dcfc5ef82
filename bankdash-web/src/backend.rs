//! HTTP API Client
//!
//! gloo-net implementation of [`Backend`] for the browser.

use async_trait::async_trait;
use bankdash::api::{join_url, paths, CategoriesResponse, MerchantsResponse, DEFAULT_API_BASE};
use bankdash::{
    ApiConfig, ApiError, Backend, CategoryTotal, MerchantTotal, SearchResponse, Timed,
    UnlockStatus,
};
use futures_util::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;

/// Local storage key holding an API base URL override
const API_URL_KEY: &str = "bankdash_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// Milliseconds from the page's high-resolution clock
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_default()
}

pub struct GlooBackend {
    base_url: String,
    timeout_ms: u32,
}

impl GlooBackend {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: u32::try_from(config.request_timeout_ms).unwrap_or(u32::MAX),
        }
    }

    /// GET a path and decode the body whatever the HTTP status, giving up
    /// after the configured timeout.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = join_url(&self.base_url, path);
        tracing::trace!(%url, "GET");

        let request = Box::pin(async move {
            let response = Request::get(&url)
                .send()
                .await
                .map_err(|e| ApiError::Transport(format!("Network error: {}", e)))?;
            if !response.ok() {
                tracing::debug!(%url, status = response.status(), "non-success status, decoding body anyway");
            }
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(format!("Parse error: {}", e)))
        });

        match select(request, TimeoutFuture::new(self.timeout_ms)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(ApiError::Timeout),
        }
    }
}

#[async_trait(?Send)]
impl Backend for GlooBackend {
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
        let started = now_ms();
        let value = self
            .get_json::<SearchResponse>(&paths::search(query, limit))
            .await?;

        Ok(Timed {
            value,
            roundtrip_ms: (now_ms() - started).max(0.0).round() as u64,
        })
    }
}
