//! Read-only client for the Shopify Admin `products.json` listing.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use trendseo_core::AppConfig;

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{CatalogProduct, ProductsPage};

/// Largest page the Admin API serves.
pub const PAGE_LIMIT: u32 = 250;

/// Maximum number of pages to fetch before returning an error.
///
/// Each page may be retried up to `max_retries` times, so the worst-case
/// request count is `MAX_PAGES * (1 + max_retries)`.
pub const MAX_PAGES: usize = 400;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Clone)]
pub struct CatalogSettings {
    /// Store host or bare store name; see [`store_host`].
    pub store: String,
    pub access_token: String,
    pub api_version: String,
    /// Only products carrying this tag are returned.
    pub update_tag: String,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for CatalogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSettings")
            .field("store", &self.store)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("update_tag", &self.update_tag)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl CatalogSettings {
    /// Catalog settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingCredentials`] when the store name or
    /// admin token is not configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let store = config
            .shopify_store_name
            .clone()
            .ok_or(CatalogError::MissingCredentials("SHOPIFY_STORE_NAME"))?;
        let access_token = config
            .shopify_admin_token
            .clone()
            .ok_or(CatalogError::MissingCredentials("SHOPIFY_ADMIN_TOKEN"))?;
        Ok(Self {
            store,
            access_token,
            api_version: config.catalog_api_version.clone(),
            update_tag: config.catalog_update_tag.clone(),
            page_delay_ms: config.catalog_page_delay_ms,
            timeout_secs: config.trends_timeout_secs,
            max_retries: config.trends_max_retries,
            backoff_base_ms: config.trends_backoff_base_ms,
            user_agent: concat!("trendseo/", env!("CARGO_PKG_VERSION")).to_owned(),
        })
    }
}

/// Normalize a store name to its `*.myshopify.com` host.
///
/// `butik` and `butik.myshopify` both become `butik.myshopify.com`; any name
/// that already contains a dot is kept as a custom host.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidStore`] for an empty name or one containing
/// a scheme, path, or whitespace.
pub fn store_host(store: &str) -> Result<String, CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidStore {
        store: store.to_owned(),
        reason: reason.to_owned(),
    };
    let name = store.trim().trim_end_matches('/').to_lowercase();
    if name.is_empty() {
        return Err(invalid("store name is empty"));
    }
    if name.contains("://") || name.contains('/') || name.contains(char::is_whitespace) {
        return Err(invalid("expected a bare host name"));
    }
    Ok(if name.ends_with(".myshopify.com") {
        name
    } else if name.ends_with(".myshopify") {
        format!("{name}.com")
    } else if name.contains('.') {
        name
    } else {
        format!("{name}.myshopify.com")
    })
}

/// HTTP client for the Admin API product listing.
///
/// Pages are walked with `since_id`; 429, 5xx, and network failures are
/// retried with exponential back-off.
pub struct CatalogClient {
    client: Client,
    products_url: Url,
    store: String,
    access_token: String,
    update_tag: String,
    page_delay: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl CatalogClient {
    /// Client for `https://{store}/admin/api/{version}/`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStore`] for an unusable store name and
    /// [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let host = store_host(&settings.store)?;
        let api_base = format!("https://{host}/admin/api/{}/", settings.api_version);
        Self::with_api_base(settings, &api_base)
    }

    /// Client against an explicit API base, such as a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStore`] when `api_base` is not a valid
    /// URL and [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn with_api_base(settings: &CatalogSettings, api_base: &str) -> Result<Self, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidStore {
            store: settings.store.clone(),
            reason,
        };
        let base = if api_base.ends_with('/') {
            api_base.to_owned()
        } else {
            format!("{api_base}/")
        };
        let products_url = Url::parse(&base)
            .and_then(|url| url.join("products.json"))
            .map_err(|e| invalid(format!("API base \"{api_base}\" is not a valid URL: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;

        Ok(Self {
            client,
            products_url,
            store: settings.store.clone(),
            access_token: settings.access_token.clone(),
            update_tag: settings.update_tag.clone(),
            page_delay: Duration::from_millis(settings.page_delay_ms),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    #[must_use]
    pub fn update_tag(&self) -> &str {
        &self.update_tag
    }

    /// One page of products with ids above `since_id`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`]: HTTP 429 after all retries.
    /// - [`CatalogError::NotFound`]: HTTP 404, not retried.
    /// - [`CatalogError::UnexpectedStatus`]: other non-2xx (5xx retried, 4xx not).
    /// - [`CatalogError::Http`]: network failure after all retries.
    /// - [`CatalogError::Deserialize`]: body is not a product listing.
    pub async fn fetch_page(&self, since_id: u64) -> Result<Vec<CatalogProduct>, CatalogError> {
        let mut url = self.products_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_LIMIT.to_string())
            .append_pair("since_id", &since_id.to_string());

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .filter(|secs| secs.is_finite() && *secs >= 0.0)
                        .map_or(2, |secs| {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            let whole = secs.ceil() as u64;
                            whole
                        });
                    return Err(CatalogError::RateLimited {
                        store: self.store.clone(),
                        retry_after_secs,
                    });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }
                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<ProductsPage>(&body)
                    .map(|page| page.products)
                    .map_err(|e| CatalogError::Deserialize {
                        context: format!("products page after id {since_id} from {}", self.store),
                        source: e,
                    })
            }
        })
        .await
    }

    /// Every product tagged with the update tag, in listing order.
    ///
    /// Pages are requested until one comes back empty, sleeping the page delay
    /// between requests. With `limit` set, the walk stops as soon as that many
    /// tagged products have been collected.
    ///
    /// Any page failure discards earlier pages and returns the error.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`], and returns
    /// [`CatalogError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn fetch_tagged_products(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        let mut tagged = Vec::new();
        let mut since_id = 0u64;
        let mut page_count = 0usize;

        if limit == Some(0) {
            return Ok(tagged);
        }

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CatalogError::PaginationLimit {
                    store: self.store.clone(),
                    max_pages: MAX_PAGES,
                });
            }
            if page_count > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let page = self.fetch_page(since_id).await?;
            let Some(last) = page.last() else {
                break;
            };
            let next_since = last.id;
            let page_len = page.len();

            tagged.extend(
                page.into_iter()
                    .filter(|product| product.has_tag(&self.update_tag)),
            );
            tracing::debug!(
                page = page_count,
                products = page_len,
                tagged = tagged.len(),
                "catalog page fetched"
            );

            if let Some(limit) = limit {
                if tagged.len() >= limit {
                    tagged.truncate(limit);
                    break;
                }
            }
            if next_since <= since_id {
                tracing::warn!(since_id, next_since, "catalog ids did not advance, stopping");
                break;
            }
            since_id = next_since;
        }

        tracing::info!(
            store = %self.store,
            tag = %self.update_tag,
            products = tagged.len(),
            pages = page_count,
            "fetched tagged catalog products"
        );
        Ok(tagged)
    }
}
