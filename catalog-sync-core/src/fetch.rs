//! Paginated retrieval of the product listing from the Shopify Admin REST API.
//!
//! [`ShopifyClient`] implements [`ProductFetcher`] over reqwest.
//! [`fetch_all_products`] drives any fetcher page by page until the listing
//! is exhausted or a request fails.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, LINK};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::contract::{CredentialProvider, ProductFetcher, ProductPage};
use crate::credentials::{SHOPIFY_ACCESS_TOKEN, SHOPIFY_STORE_URL};

/// Maximum number of products requested per call.
pub const PAGE_SIZE: usize = 250;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// A single failed page request. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} has no products array")]
    MissingProducts { url: String },
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    products: Option<Vec<serde_json::Value>>,
}

/// Client for `GET {base}/products.json`.
pub struct ShopifyClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ShopifyClient {
    /// `base_url` is the API root, e.g. `https://shop.myshopify.com/admin/api/2024-07`.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Build a client from the store URL, token and API version in `credentials`.
    ///
    /// Missing values produce an unusable client rather than an error; callers
    /// gate on [`CredentialProvider::is_catalog_sync_ready`] before fetching.
    pub fn from_provider<P: CredentialProvider + ?Sized>(credentials: &P) -> Self {
        let store = credentials.get(SHOPIFY_STORE_URL).unwrap_or_default();
        let token = credentials.get(SHOPIFY_ACCESS_TOKEN).unwrap_or_default();
        let base_url = admin_base_url(store, credentials.api_version());
        info!(base_url = %base_url, token_set = !token.is_empty(), "Initialised Shopify client");
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full listing URL for the given cursor.
    ///
    /// The cursor is percent-encoded, so it reaches the API exactly as it was
    /// advertised in the previous `Link` header.
    pub fn products_url(&self, page_info: Option<&str>) -> String {
        let endpoint = format!("{}/products.json", self.base_url);
        let limit = PAGE_SIZE.to_string();
        let mut url = match Url::parse(&endpoint) {
            Ok(url) => url,
            // An unparseable base still yields a request that fails as a transport error.
            Err(_) => return format!("{endpoint}?limit={limit}"),
        };
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit);
            if let Some(cursor) = page_info {
                query.append_pair("page_info", cursor);
            }
        }
        url.into()
    }
}

#[async_trait]
impl ProductFetcher for ShopifyClient {
    async fn fetch_page(&self, page_info: Option<String>) -> Result<ProductPage, FetchError> {
        let url = self.products_url(page_info.as_deref());
        debug!(url = %url, "Requesting product page");

        let response = self
            .client
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let next_page_info = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_info);

        let envelope: ProductsEnvelope =
            response.json().await.map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;
        let products = envelope
            .products
            .ok_or(FetchError::MissingProducts { url })?;

        Ok(ProductPage {
            products,
            next_page_info,
        })
    }
}

/// API root for a store, tolerating a scheme prefix or trailing slash on `store`.
pub fn admin_base_url(store: &str, api_version: &str) -> String {
    let host = store
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{host}/admin/api/{api_version}")
}

/// Extract the `page_info` cursor of the `rel="next"` entry in a `Link` header.
pub fn next_page_info(link_header: &str) -> Option<String> {
    static NEXT_LINK: OnceLock<Regex> = OnceLock::new();
    let re = NEXT_LINK.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).expect("next-link pattern is valid")
    });

    let target = re.captures(link_header)?.get(1)?.as_str();
    let url = Url::parse(target).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page_info")
        .map(|(_, value)| value.into_owned())
}

/// Retrieve every page from `fetcher` and concatenate the records.
///
/// Stops after a page shorter than [`PAGE_SIZE`], after a full page that
/// carries no cursor, or on the first failed request. A failure is logged and
/// ends pagination; records gathered before it are kept.
pub async fn fetch_all_products<F>(fetcher: &F) -> Vec<serde_json::Value>
where
    F: ProductFetcher + ?Sized,
{
    let mut products = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let page = match fetcher.fetch_page(cursor.take()).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, page = page_number, "[SYNC][FETCH] API request failed, ending pagination");
                break;
            }
        };

        let batch = page.products.len();
        products.extend(page.products);
        info!(
            page = page_number,
            batch,
            total = products.len(),
            "[SYNC][FETCH] Fetched product page"
        );

        if batch < PAGE_SIZE {
            break;
        }
        match page.next_page_info {
            Some(next) => cursor = Some(next),
            None => {
                warn!(page = page_number, "[SYNC][FETCH] Full page without a next cursor, stopping");
                break;
            }
        }
    }

    products
}
