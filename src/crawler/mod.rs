//! Crawl passes and their shared fetch layer

pub mod fetcher;
pub mod profiles;
pub mod sales;

pub use fetcher::{FetchError, FetchResponse, Fetcher, Method};
pub use profiles::{run_reward_pass, ProfileCrawler};
pub use sales::{run_sale_pass, Sale, SaleCrawler, SaleIndex};

use crate::session::{session_cookie_jar, Session};
use crate::storage::{FileStore, OWNED_FILE};
use crate::{Config, Result};

/// Builds the file store, fetcher, and session a pass runs against.
///
/// The owned-game cache is optional on disk; an account with no cached
/// library simply starts empty and fills in as claims succeed.
pub(crate) fn bootstrap(config: &Config) -> Result<(FileStore, Fetcher, Session)> {
    let store = FileStore::new(&config.files.data_dir);

    let jar = session_cookie_jar(&config.session.cookie, &config.platform.root_url)?;
    let fetcher = Fetcher::new(&config.fetcher, jar)?;

    let owned = store
        .load_optional_set(OWNED_FILE)?
        .into_iter()
        .collect();
    let session = Session::new(config.session.csrf_token.clone(), owned);
    tracing::info!("Session holds {} owned games", session.owned_count());

    Ok((store, fetcher, session))
}
