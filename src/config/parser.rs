use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[platform]
root-url = "https://itch.io"
sale-limit-url = "https://caches.example.com/data/resume_index.txt"
active-cache-url = "https://caches.example.com/api/active.json"
upcoming-cache-url = "https://caches.example.com/api/upcoming.json"
free-games-url = "https://caches.example.com/api/active.json"

[session]
cookie = "itchio=abc123"
csrf-token = "token"

[files]
data-dir = "./data"
"#;

    #[test]
    fn test_load_valid_config_with_defaults() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.platform.root_url, "https://itch.io");
        assert_eq!(config.fetcher.request_delay_ms, 25);
        assert_eq!(config.fetcher.retry_delay_ms, 50);
        assert_eq!(config.crawler.segment_step, 5000);
        assert_eq!(config.crawler.scrape_limit, 1000);
        assert_eq!(config.crawler.sale_limit, None);
    }

    #[test]
    fn test_load_config_overrides() {
        let content = format!(
            "{}\n[crawler]\nsegment-step = 100\nscrape-limit = 10\nsale-limit = 250\n",
            VALID_CONFIG
        );
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.segment_step, 100);
        assert_eq!(config.crawler.scrape_limit, 10);
        assert_eq!(config.crawler.sale_limit, Some(250));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace("itchio=abc123", "");
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }
}
