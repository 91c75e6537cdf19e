//! Profile and collection discovery crawler
//!
//! Community copies are not announced anywhere central; they surface on
//! creator pages. This crawler walks creator catalogues transitively:
//! every game cell names its creator, every creator page lists more
//! games. Each creator has two addressable forms — the subdomain and the
//! `/profile/` page — and each form is visited at most once per run,
//! bounded by the shared request ceiling.

use crate::claim::evaluate_candidate;
use crate::extract::{game_cell_urls, CollectionPage, GameCellKind};
use crate::session::Session;
use crate::state::RunState;
use crate::storage::{
    ACTIVE_FILE, COLLECTIONS_FILE, IGNORE_FILE, OWNED_FILE, PROFILES_FILE,
};
use crate::{url, Config, Result};
use std::collections::BTreeSet;

use super::{bootstrap, Fetcher};

/// Walks creator profiles and curated collections for one run.
pub struct ProfileCrawler<'a> {
    pub fetcher: &'a Fetcher,
    pub session: &'a mut Session,
    pub state: &'a mut RunState,
    pub root_url: &'a str,
}

impl<'a> ProfileCrawler<'a> {
    /// Visits one addressing form of a creator's catalogue.
    ///
    /// `alt` selects the `/profile/` page form; otherwise the creator
    /// subdomain is fetched directly. Candidates already owned, active,
    /// or ignored are filtered before the claim machine sees them.
    /// Failures are confined to this profile.
    pub async fn scrape_profile(&mut self, creator_url: &str, alt: bool) {
        self.state.note_profile(creator_url);

        if self.state.budget_exhausted() {
            return;
        }
        if !self.state.mark_checked(creator_url, alt) {
            return;
        }

        let target = if alt {
            match url::profile_page(creator_url) {
                Some(page) => page,
                None => {
                    tracing::warn!("Not a creator URL: {}", creator_url);
                    return;
                }
            }
        } else {
            creator_url.to_string()
        };

        let page = match self.fetcher.get(&target).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failure while checking {}: {}", target, e);
                return;
            }
        };
        if !page.is_ok() {
            tracing::debug!("Profile {} returned status {}", target, page.status);
            return;
        }

        for candidate in game_cell_urls(&page.body, GameCellKind::ProfilePage) {
            if self.state.budget_exhausted() {
                break;
            }

            if let Some(creator) = url::creator_profile(&candidate) {
                self.state.note_profile(&creator);
            }

            if self.session.owns(&candidate) {
                continue;
            }
            if self.state.is_known(&candidate) {
                continue;
            }

            evaluate_candidate(
                self.fetcher,
                self.session,
                self.state,
                self.root_url,
                &candidate,
            )
            .await;
        }
    }

    /// Paginates a collection's JSON feed, scraping every creator found.
    ///
    /// Pagination stops at the first page reporting zero items or at the
    /// request ceiling.
    pub async fn scrape_collections(&mut self, collection_url: &str) {
        let mut page_num = 1;
        loop {
            if self.state.budget_exhausted() {
                return;
            }

            let target = url::collection_page_url(collection_url, page_num);
            let response = match self.fetcher.get(&target).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Failure while checking {}: {}", target, e);
                    return;
                }
            };
            let page: CollectionPage = match serde_json::from_str(&response.body) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Collection page parse failed for {}: {}", target, e);
                    return;
                }
            };
            if page.num_items == 0 {
                return;
            }

            for candidate in game_cell_urls(&page.content, GameCellKind::ProfilePage) {
                if let Some(creator) = url::creator_profile(&candidate) {
                    if !self.state.is_checked(&creator, true) {
                        self.scrape_profile(&creator, true).await;
                    }
                }
            }

            page_num += 1;
        }
    }

    /// One full discovery pass.
    ///
    /// Known-interesting sources are revalidated before new ones are
    /// explored: known profiles, then creators of known-active games,
    /// then collections, then newly discovered profiles (both forms),
    /// then creators of ignored games (both forms). The shared ceiling
    /// bounds the whole pass.
    pub async fn run_pass(&mut self, collections: &BTreeSet<String>) {
        tracing::info!("Checking known profiles");
        for profile in self.state.profiles.clone() {
            self.scrape_profile(&profile, true).await;
        }

        tracing::info!("Checking creators of active games");
        for game_url in self.state.active.clone() {
            if let Some(creator) = url::creator_profile(&game_url) {
                self.scrape_profile(&creator, true).await;
            }
        }

        tracing::info!("Checking collections");
        for collection in collections {
            self.scrape_collections(collection).await;
        }

        tracing::info!("Checking discovered profiles");
        for profile in self.state.profiles.clone() {
            self.scrape_profile(&profile, true).await;
            self.scrape_profile(&profile, false).await;
        }

        tracing::info!("Re-checking creators of ignored games");
        for game_url in self.state.ignore.clone() {
            if let Some(creator) = url::creator_profile(&game_url) {
                self.scrape_profile(&creator, true).await;
                self.scrape_profile(&creator, false).await;
            }
        }
    }
}

/// Runs one full reward-discovery pass: load sets, crawl, persist.
pub async fn run_reward_pass(config: &Config) -> Result<()> {
    let (store, fetcher, mut session) = bootstrap(config)?;

    let mut state = RunState::new(config.crawler.scrape_limit);
    state.ignore = store.load_required_set(IGNORE_FILE)?;
    state.active = store.load_required_set(ACTIVE_FILE)?;
    state.profiles = store.load_required_set(PROFILES_FILE)?;
    let collections = store.load_required_set(COLLECTIONS_FILE)?;
    state.reconcile_owned(session.owned());

    let mut crawler = ProfileCrawler {
        fetcher: &fetcher,
        session: &mut session,
        state: &mut state,
        root_url: &config.platform.root_url,
    };
    crawler.run_pass(&collections).await;

    tracing::info!(
        "Requests spent: {} / {}",
        state.scrape_count,
        state.scrape_limit
    );

    store.save_set(ACTIVE_FILE, &state.active)?;
    store.save_set(IGNORE_FILE, &state.ignore)?;
    store.save_set(PROFILES_FILE, &state.profiles)?;
    store.save_set(OWNED_FILE, &session.owned().iter().cloned().collect())?;

    Ok(())
}
