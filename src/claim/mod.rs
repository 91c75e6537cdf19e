//! Claim machines
//!
//! Two machines submit claims: the reward machine inspects a game's
//! reward tiers for free community copies, and the direct machine claims
//! items already known to be free. Both judge success the same way: a
//! claim succeeded iff the final response did not land back on the
//! platform root.

pub mod direct;
pub mod reward;

pub use direct::{claim_direct, run_free_pass, DirectOutcome};
pub use reward::{evaluate_candidate, RewardOutcome};

use crate::crawler::{bootstrap, Fetcher};
use crate::extract::promotion_over;
use crate::state::RunState;
use crate::{Config, Result};
use serde::Deserialize;

/// One game entry, as served by the free-games feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    /// Platform id; -1 when the source did not know it.
    #[serde(default = "unknown_id")]
    pub id: i64,

    /// Store page URL — the identity key for a game.
    pub url: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub claimed: bool,
}

fn unknown_id() -> i64 {
    -1
}

/// Shared success judgment for a submitted claim form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClaimVerdict {
    /// Final URL left the platform root behind: the claim registered.
    Claimed,

    /// Landed on the root with the expired-promotion notice.
    Expired,

    /// Landed on the root for any other reason.
    Rejected,
}

/// Judges a claim submission by where its final response landed.
pub(crate) fn judge_claim(final_url: &str, body: &str, root_url: &str) -> ClaimVerdict {
    if final_url.trim_end_matches('/') != root_url.trim_end_matches('/') {
        return ClaimVerdict::Claimed;
    }
    if promotion_over(body) {
        ClaimVerdict::Expired
    } else {
        ClaimVerdict::Rejected
    }
}

/// Claims a single game by URL: the direct machine first, then a reward
/// evaluation in case the game also runs a community-copy program.
pub async fn run_claim_url(config: &Config, game_url: &str) -> Result<()> {
    let (store, fetcher, mut session) = bootstrap(config)?;
    let mut state = RunState::new(config.crawler.scrape_limit);

    tracing::info!("Attempting to claim {}", game_url);

    let direct = claim_direct(
        &fetcher,
        &mut session,
        &config.platform.root_url,
        game_url,
    )
    .await;
    tracing::info!("Direct claim: {:?}", direct);

    let reward = evaluate_candidate(
        &fetcher,
        &mut session,
        &mut state,
        &config.platform.root_url,
        game_url,
    )
    .await;
    tracing::info!("Reward claim: {:?}", reward);

    store.save_set(
        crate::storage::OWNED_FILE,
        &session.owned().iter().cloned().collect(),
    )?;
    Ok(())
}

/// Fetches a remote cache of game entries.
pub(crate) async fn fetch_game_list(fetcher: &Fetcher, url: &str) -> Result<Vec<Game>> {
    let response = fetcher.get(url).await?;
    if !response.is_ok() {
        return Err(crate::GleanError::Extract {
            url: url.to_string(),
            message: format!("game list returned status {}", response.status),
        });
    }
    Ok(serde_json::from_str(&response.body)?)
}
