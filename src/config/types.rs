use serde::Deserialize;

/// Main configuration structure for the gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub platform: PlatformConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub session: SessionConfig,
    pub files: FilesConfig,
}

/// Platform endpoints the crawlers consume
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Platform root; claim success is judged against landing here.
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Remote index publishing the upper bound of the sale-id space.
    #[serde(rename = "sale-limit-url")]
    pub sale_limit_url: String,

    /// Remote cache of currently active free sales.
    #[serde(rename = "active-cache-url")]
    pub active_cache_url: String,

    /// Remote cache of not-yet-started free sales.
    #[serde(rename = "upcoming-cache-url")]
    pub upcoming_cache_url: String,

    /// Free-games feed consumed by the direct-claim pass.
    #[serde(rename = "free-games-url")]
    pub free_games_url: String,
}

/// Fetch pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Fixed self-throttle before every request attempt (milliseconds).
    #[serde(rename = "request-delay-ms", default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Extra delay after an HTTP 429 before the retry (milliseconds).
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds).
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay(),
            retry_delay_ms: default_retry_delay(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Crawl pass configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Sale ids processed per run of the sale crawler.
    #[serde(rename = "segment-step", default = "default_segment_step")]
    pub segment_step: u64,

    /// Per-run request ceiling shared by the profile crawler.
    #[serde(rename = "scrape-limit", default = "default_scrape_limit")]
    pub scrape_limit: u32,

    /// Overrides the remote sale-id upper bound when set.
    #[serde(rename = "sale-limit", default)]
    pub sale_limit: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            segment_step: default_segment_step(),
            scrape_limit: default_scrape_limit(),
            sale_limit: None,
        }
    }
}

/// Session material provided by the external login component
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Platform session cookie as a raw `name=value` pair.
    pub cookie: String,

    /// Anti-forgery token for state-changing requests.
    #[serde(rename = "csrf-token")]
    pub csrf_token: String,
}

/// Data directory layout
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory holding URL sets, the cursor, and segment logs.
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

fn default_request_delay() -> u64 {
    25
}

fn default_retry_delay() -> u64 {
    50
}

fn default_timeout() -> u64 {
    25
}

fn default_user_agent() -> String {
    format!("itch-gleaner/{}", env!("CARGO_PKG_VERSION"))
}

fn default_segment_step() -> u64 {
    5000
}

fn default_scrape_limit() -> u32 {
    1000
}
