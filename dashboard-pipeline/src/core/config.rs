use defect_client::ClientConfig;
use shared::models::CoordinateOrder;
use std::time::Duration;

/// Pipeline configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | API_BASE_URL | http://localhost:8080 | capture-point API base |
/// | API_TOKEN | - | bearer token |
/// | REQUEST_TIMEOUT_SECS | 30 | transport timeout |
/// | ADDRESS_TREE_PATH | data/address.json | address tree JSON |
/// | DEFAULT_LEVEL1 | 대전광역시 | initial province |
/// | DEFAULT_LEVEL2 | 유성구 | initial city (empty = first child) |
/// | BOUNDS_DEBOUNCE_MS | 500 | debounced viewport delay |
/// | COORDINATE_ORDER | lnglat | order of incoming pairs (lnglat, latlng, auto) |
/// | FETCH_CONCURRENCY | 0 | concurrent detail fetches, 0 = unbounded |
/// | ITEMS_PER_PAGE | 5 | list page size |
/// | MAX_VISIBLE_PAGES | 5 | page-number window |
/// | LOG_LEVEL | info | log level |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | - | daily rolling log directory |
///
/// # Example
///
/// ```ignore
/// API_BASE_URL=https://defects.example.com COORDINATE_ORDER=auto cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub address_tree_path: String,
    pub default_level1: String,
    pub default_level2: Option<String>,
    pub bounds_debounce_ms: u64,
    /// Order of coordinate pairs in the capture-point feed
    pub coordinate_order: CoordinateOrder,
    /// 0 = no cap
    pub fetch_concurrency: usize,
    pub items_per_page: usize,
    pub max_visible_pages: usize,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_base_url: non_empty("API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".into()),
            api_token: non_empty("API_TOKEN"),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            address_tree_path: non_empty("ADDRESS_TREE_PATH")
                .unwrap_or_else(|| "data/address.json".into()),
            default_level1: non_empty("DEFAULT_LEVEL1").unwrap_or_else(|| "대전광역시".into()),
            default_level2: match lookup("DEFAULT_LEVEL2") {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v),
                None => Some("유성구".into()),
            },
            bounds_debounce_ms: lookup("BOUNDS_DEBOUNCE_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            coordinate_order: lookup("COORDINATE_ORDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            fetch_concurrency: lookup("FETCH_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            items_per_page: lookup("ITEMS_PER_PAGE")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(5),
            max_visible_pages: lookup("MAX_VISIBLE_PAGES")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(5),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: lookup("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: non_empty("LOG_DIR"),
        }
    }

    /// Client settings for the capture-point API
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_base_url).with_timeout(self.request_timeout_secs);
        match &self.api_token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }

    pub fn bounds_debounce(&self) -> Duration {
        Duration::from_millis(self.bounds_debounce_ms)
    }

    /// `None` when fetches are unbounded
    pub fn fetch_limit(&self) -> Option<usize> {
        (self.fetch_concurrency > 0).then_some(self.fetch_concurrency)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.default_level1, "대전광역시");
        assert_eq!(config.default_level2.as_deref(), Some("유성구"));
        assert_eq!(config.bounds_debounce(), Duration::from_millis(500));
        assert_eq!(config.coordinate_order, CoordinateOrder::LngLat);
        assert_eq!(config.fetch_limit(), None);
        assert_eq!(config.items_per_page, 5);
        assert_eq!(config.max_visible_pages, 5);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("API_BASE_URL", "https://defects.example.com"),
            ("API_TOKEN", "abc"),
            ("COORDINATE_ORDER", "latlng"),
            ("FETCH_CONCURRENCY", "8"),
            ("ITEMS_PER_PAGE", "20"),
            ("DEFAULT_LEVEL2", ""),
        ]);
        assert_eq!(config.api_base_url, "https://defects.example.com");
        assert_eq!(config.coordinate_order, CoordinateOrder::LatLng);
        assert_eq!(config.fetch_limit(), Some(8));
        assert_eq!(config.items_per_page, 20);
        assert!(config.default_level2.is_none());

        let client = config.client_config();
        assert_eq!(client.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("ITEMS_PER_PAGE", "0"),
            ("BOUNDS_DEBOUNCE_MS", "soon"),
            ("COORDINATE_ORDER", "xy"),
        ]);
        assert_eq!(config.items_per_page, 5);
        assert_eq!(config.bounds_debounce_ms, 500);
        assert_eq!(config.coordinate_order, CoordinateOrder::LngLat);
    }
}
