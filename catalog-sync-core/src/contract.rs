//! # contract: the seams of the sync pipeline
//!
//! Two capabilities are injected into [`crate::synchronise::synchronise`]:
//!
//! - [`CredentialProvider`]: named settings and per-consumer readiness checks.
//!   Implemented by [`crate::credentials::Credentials`].
//! - [`ProductFetcher`]: one page of raw product records from the upstream
//!   catalog API. Implemented by [`crate::fetch::ShopifyClient`] and, for
//!   tests, by the generated `MockProductFetcher`.
//!
//! ## Mocking & Testing
//! `ProductFetcher` is annotated for `mockall`; the mock is exported behind the
//! default `test-export-mocks` feature so integration tests can assert on call
//! counts.

use async_trait::async_trait;
use mockall::automock;

use crate::credentials::{
    CATALOG_SETTINGS, CLOUD_SETTINGS, DEFAULT_API_VERSION, REQUIRED_SETTINGS, SHOPIFY_API_VERSION,
};
use crate::fetch::FetchError;

/// Read-only access to configuration values and the readiness of each consumer.
///
/// Only `get` must be implemented; every predicate is derived from it so that
/// all implementors agree on what "present" means (set and non-empty).
pub trait CredentialProvider {
    /// The raw value of a setting, or `None` if it is unset.
    fn get(&self, name: &str) -> Option<&str>;

    /// True if the setting is set to a non-empty value.
    fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// The Admin API version, falling back to [`DEFAULT_API_VERSION`].
    fn api_version(&self) -> &str {
        self.get(SHOPIFY_API_VERSION)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Store URL and access token are both present.
    fn is_catalog_sync_ready(&self) -> bool {
        CATALOG_SETTINGS.iter().all(|name| self.is_set(name))
    }

    /// Every cloud-storage setting, including the encoded rclone config, is present.
    fn is_cloud_ready(&self) -> bool {
        CLOUD_SETTINGS.iter().all(|name| self.is_set(name))
    }

    /// Names of all required settings that are missing, in check order.
    fn missing_settings(&self) -> Vec<&'static str> {
        REQUIRED_SETTINGS
            .iter()
            .copied()
            .filter(|name| !self.is_set(name))
            .collect()
    }

    /// True iff nothing any consumer needs is missing. Logs the missing names otherwise.
    fn validate_all(&self) -> bool {
        let missing = self.missing_settings();
        if missing.is_empty() {
            return true;
        }
        tracing::error!(missing = %missing.join(", "), "Missing environment variables");
        false
    }
}

/// One page of the upstream product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    /// Raw product records exactly as returned by the API.
    pub products: Vec<serde_json::Value>,
    /// Cursor for the following page, if the API advertised one.
    pub next_page_info: Option<String>,
}

/// Trait for retrieving the product listing one page at a time.
///
/// `page_info` is `None` for the first request and the cursor from the
/// previous [`ProductPage`] afterwards.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch_page(&self, page_info: Option<String>) -> Result<ProductPage, FetchError>;
}
