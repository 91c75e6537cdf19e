use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that every endpoint parses as an absolute URL, that the session
/// material is plausible, and that the crawl parameters are non-degenerate.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for (name, value) in [
        ("platform.root-url", &config.platform.root_url),
        ("platform.sale-limit-url", &config.platform.sale_limit_url),
        ("platform.active-cache-url", &config.platform.active_cache_url),
        (
            "platform.upcoming-cache-url",
            &config.platform.upcoming_cache_url,
        ),
        ("platform.free-games-url", &config.platform.free_games_url),
    ] {
        let parsed = Url::parse(value)
            .map_err(|_| ConfigError::InvalidUrl(format!("{} = {:?}", name, value)))?;
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!("{} = {:?}", name, value)));
        }
    }

    if config.crawler.segment_step == 0 {
        return Err(ConfigError::Validation(
            "crawler.segment-step must be greater than zero".to_string(),
        ));
    }

    if config.crawler.scrape_limit == 0 {
        return Err(ConfigError::Validation(
            "crawler.scrape-limit must be greater than zero".to_string(),
        ));
    }

    if config.fetcher.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetcher.timeout-secs must be greater than zero".to_string(),
        ));
    }

    if !config.session.cookie.contains('=') {
        return Err(ConfigError::Validation(
            "session.cookie must be a name=value pair".to_string(),
        ));
    }

    if config.session.csrf_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "session.csrf-token must not be empty".to_string(),
        ));
    }

    if config.files.data_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "files.data-dir must not be empty".to_string(),
        ));
    }

    Ok(())
}
