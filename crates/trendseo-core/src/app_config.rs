use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// `None` selects the built-in Danish profile.
    pub market_path: Option<PathBuf>,
    pub trends_base_url: String,
    pub trends_geo: String,
    pub trends_timeframe: String,
    pub trends_hl: String,
    pub trends_batch_size: usize,
    pub trends_min_delay_ms: u64,
    pub trends_timeout_secs: u64,
    pub trends_max_retries: u32,
    pub trends_backoff_base_ms: u64,
    pub trends_cache: bool,
    pub display_limit: usize,
    pub shopify_store_name: Option<String>,
    pub shopify_admin_token: Option<String>,
    pub catalog_api_version: String,
    pub catalog_page_delay_ms: u64,
    pub catalog_update_tag: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("market_path", &self.market_path)
            .field("trends_base_url", &self.trends_base_url)
            .field("trends_geo", &self.trends_geo)
            .field("trends_timeframe", &self.trends_timeframe)
            .field("trends_hl", &self.trends_hl)
            .field("trends_batch_size", &self.trends_batch_size)
            .field("trends_min_delay_ms", &self.trends_min_delay_ms)
            .field("trends_timeout_secs", &self.trends_timeout_secs)
            .field("trends_max_retries", &self.trends_max_retries)
            .field("trends_backoff_base_ms", &self.trends_backoff_base_ms)
            .field("trends_cache", &self.trends_cache)
            .field("display_limit", &self.display_limit)
            .field("shopify_store_name", &self.shopify_store_name)
            .field(
                "shopify_admin_token",
                &self.shopify_admin_token.as_ref().map(|_| "[redacted]"),
            )
            .field("catalog_api_version", &self.catalog_api_version)
            .field("catalog_page_delay_ms", &self.catalog_page_delay_ms)
            .field("catalog_update_tag", &self.catalog_update_tag)
            .finish()
    }
}
