//! Configuration loading and validation

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{
    Config, CrawlerConfig, FetcherConfig, FilesConfig, PlatformConfig, SessionConfig,
};
pub use validation::validate;
