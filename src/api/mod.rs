//! Workshop API
//!
//! The dashboard consumes four JSON endpoints, all `GET`:
//!
//! | Endpoint | Returns |
//! |---|---|
//! | `/api/status` | unlock flags |
//! | `/api/categories/top?limit=N` | top spending categories |
//! | `/api/categories/{category}/top?limit=N` | top merchants in a category |
//! | `/api/search?q=Q&limit=N` | semantic transaction search |
//!
//! [`Backend`] is the seam between the engine and HTTP: [`HttpBackend`]
//! implements it with reqwest, the browser build with `gloo-net`.

mod dto;
mod error;

#[cfg(feature = "native")]
mod client;

pub use dto::{
    similarity_percent, CategoriesResponse, CategoryTotal, MerchantTotal, MerchantsResponse,
    SearchHit, SearchResponse, Timed,
};
pub use error::ApiError;

#[cfg(feature = "native")]
pub use client::HttpBackend;

use async_trait::async_trait;

use crate::state::UnlockStatus;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Data source for the dashboard
///
/// Implementations decode the JSON envelopes and apply
/// [`CategoriesResponse::into_items`]/[`MerchantsResponse::into_items`], so
/// an `error` field surfaces as [`ApiError::Reported`]. Search responses are
/// returned whole together with the measured round-trip time.
#[async_trait(?Send)]
pub trait Backend {
    async fn status(&self) -> Result<UnlockStatus, ApiError>;

    async fn top_categories(&self, limit: usize) -> Result<Vec<CategoryTotal>, ApiError>;

    async fn category_merchants(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<MerchantTotal>, ApiError>;

    async fn search(&self, query: &str, limit: usize) -> Result<Timed<SearchResponse>, ApiError>;
}

/// Request paths, relative to the API base URL
pub mod paths {
    pub fn status() -> String {
        "/api/status".to_string()
    }

    pub fn top_categories(limit: usize) -> String {
        format!("/api/categories/top?limit={}", limit)
    }

    pub fn category_merchants(category: &str, limit: usize) -> String {
        format!(
            "/api/categories/{}/top?limit={}",
            urlencoding::encode(category),
            limit
        )
    }

    pub fn search(query: &str, limit: usize) -> String {
        format!("/api/search?q={}&limit={}", urlencoding::encode(query), limit)
    }
}

/// Join a base URL and a request path
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
