//! Reward-claim state machine
//!
//! Evaluates one candidate game for a free community-copy tier and claims
//! it when copies are available. The progression mirrors `ClaimState`:
//! metadata check, free-tier search, availability check, claim request,
//! confirmation. Every failure is confined to the candidate: the outcome
//! is recorded in the run state and the crawl moves on.

use super::{judge_claim, ClaimVerdict};
use crate::crawler::Fetcher;
use crate::extract::{claim_form_action, free_tiers, DownloadResponse, GameData};
use crate::session::Session;
use crate::state::{ClaimState, RunState};
use crate::{url, GleanError, Result};

/// Terminal result of evaluating one reward candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardOutcome {
    /// A free tier had copies and the claim confirmed.
    Claimed,

    /// A free tier exists but no copies remain; worth re-checking on a
    /// future run.
    Unavailable,

    /// No reward section or no free tier; permanently skipped.
    Invalid,

    /// The claim path broke down; skipped for this run.
    Failed(String),
}

/// Evaluates a candidate and records the outcome in the run state.
///
/// Claimed and Unavailable land in the active set (the game has a real
/// free tier); Invalid and Failed land in the ignore set. Callers filter
/// owned games before handing a candidate here.
pub async fn evaluate_candidate(
    fetcher: &Fetcher,
    session: &mut Session,
    state: &mut RunState,
    root_url: &str,
    game_url: &str,
) -> RewardOutcome {
    state.count_request();

    let outcome = match evaluate(fetcher, session, root_url, game_url).await {
        Ok(outcome) => outcome,
        Err(e) => RewardOutcome::Failed(e.to_string()),
    };

    match &outcome {
        RewardOutcome::Claimed => {
            tracing::info!("Claimed community copy of {}", game_url);
            session.record_owned(game_url);
            state.mark_active(game_url);
        }
        RewardOutcome::Unavailable => {
            tracing::debug!("No copies left for {}", game_url);
            state.mark_active(game_url);
        }
        RewardOutcome::Invalid => {
            state.mark_ignored(game_url);
        }
        RewardOutcome::Failed(reason) => {
            tracing::warn!("Claim failed for {}: {}", game_url, reason);
            state.mark_ignored(game_url);
        }
    }

    outcome
}

/// Moves the machine to its next state, rejecting illegal jumps.
fn advance(machine: &mut ClaimState, next: ClaimState) -> Result<()> {
    if !machine.allows(next) {
        return Err(GleanError::InvalidTransition {
            from: *machine,
            to: next,
        });
    }
    *machine = next;
    Ok(())
}

async fn evaluate(
    fetcher: &Fetcher,
    session: &Session,
    root_url: &str,
    game_url: &str,
) -> Result<RewardOutcome> {
    let mut machine = ClaimState::Unknown;

    // Metadata check: games without a reward program are invalid.
    let response = fetcher.get(&url::game_data_url(game_url)).await?;
    if !response.is_ok() {
        return Ok(RewardOutcome::Failed(format!(
            "metadata returned status {}",
            response.status
        )));
    }
    let data: GameData = match serde_json::from_str(&response.body) {
        Ok(data) => data,
        Err(e) => return Ok(RewardOutcome::Failed(format!("metadata parse: {}", e))),
    };

    let free = free_tiers(&data);
    if free.is_empty() {
        advance(&mut machine, ClaimState::Invalid)?;
        return Ok(RewardOutcome::Invalid);
    }
    advance(&mut machine, ClaimState::Valid)?;

    // Free tier confirmed; find one with claimable copies.
    let tier = match free.iter().find(|tier| tier.available) {
        Some(tier) => tier,
        None => {
            advance(&mut machine, ClaimState::Unavailable)?;
            return Ok(RewardOutcome::Unavailable);
        }
    };
    advance(&mut machine, ClaimState::Available)?;

    // Request the per-reward download URL.
    let endpoint = url::download_request_url(game_url, &session.csrf_token, Some(tier.id));
    let response = fetcher.post(&endpoint, None).await?;
    let download: DownloadResponse = match serde_json::from_str(&response.body) {
        Ok(download) => download,
        Err(e) => return Ok(RewardOutcome::Failed(format!("download_url parse: {}", e))),
    };
    let download_url = match download.url {
        Some(url) => url,
        None => {
            return Ok(RewardOutcome::Failed(format!(
                "download_url errors: {:?}",
                download.errors
            )))
        }
    };

    // Follow it and submit the claim form.
    let response = fetcher.get(&download_url).await?;
    let action = match claim_form_action(&response.body) {
        Some(action) => action,
        None => return Ok(RewardOutcome::Failed("no claim box".to_string())),
    };
    advance(&mut machine, ClaimState::Requested)?;

    let csrf = session.csrf_token.clone();
    let response = fetcher
        .post(&action, Some(&[("csrf_token", csrf.as_str())]))
        .await?;

    Ok(
        match judge_claim(&response.final_url, &response.body, root_url) {
            ClaimVerdict::Claimed => {
                advance(&mut machine, ClaimState::Claimed)?;
                RewardOutcome::Claimed
            }
            ClaimVerdict::Expired => {
                advance(&mut machine, ClaimState::Failed)?;
                RewardOutcome::Failed("promotion is no longer active".to_string())
            }
            ClaimVerdict::Rejected => {
                advance(&mut machine, ClaimState::Failed)?;
                RewardOutcome::Failed("claim landed on the platform root".to_string())
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;
    use reqwest::cookie::Jar;
    use std::collections::HashSet;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> Fetcher {
        let config = FetcherConfig {
            request_delay_ms: 1,
            retry_delay_ms: 1,
            timeout_secs: 5,
            user_agent: "test-gleaner/0.0".to_string(),
        };
        Fetcher::new(&config, Arc::new(Jar::default())).unwrap()
    }

    #[tokio::test]
    async fn test_game_without_rewards_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"title":"x"}"#))
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let mut session = Session::new("tok", HashSet::new());
        let mut state = RunState::new(100);
        let game_url = format!("{}/game", server.uri());

        let outcome =
            evaluate_candidate(&fetcher, &mut session, &mut state, &server.uri(), &game_url).await;

        assert_eq!(outcome, RewardOutcome::Invalid);
        assert!(state.ignore.contains(&game_url));
        assert!(!state.active.contains(&game_url));
    }

    #[tokio::test]
    async fn test_free_but_out_of_copies_stays_active() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"rewards":[{"id":1,"price":"$0.00","available":false}]}"#,
            ))
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let mut session = Session::new("tok", HashSet::new());
        let mut state = RunState::new(100);
        let game_url = format!("{}/game", server.uri());

        let outcome =
            evaluate_candidate(&fetcher, &mut session, &mut state, &server.uri(), &game_url).await;

        assert_eq!(outcome, RewardOutcome::Unavailable);
        assert!(state.active.contains(&game_url));
        assert!(!state.ignore.contains(&game_url));
    }

    #[tokio::test]
    async fn test_full_claim_path_succeeds() {
        let server = MockServer::start().await;
        let root = server.uri();

        Mock::given(method("GET"))
            .and(path("/game/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"rewards":[{"id":7,"price":"$0.00","available":true}]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/game/download_url"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"url":"{}/game/download/key123"}}"#,
                root
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/game/download/key123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<div class="claim_to_download_box warning_box">
                       <form action="{}/game/claim"><button>Claim</button></form>
                   </div>"#,
                root
            )))
            .mount(&server)
            .await;
        // Claim confirmation lands on the download page, not the root.
        Mock::given(method("POST"))
            .and(path("/game/claim"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>yours</html>"))
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let mut session = Session::new("tok", HashSet::new());
        let mut state = RunState::new(100);
        let game_url = format!("{}/game", root);

        let outcome =
            evaluate_candidate(&fetcher, &mut session, &mut state, "https://itch.io", &game_url)
                .await;

        assert_eq!(outcome, RewardOutcome::Claimed);
        assert!(session.owns(&game_url));
        assert!(state.active.contains(&game_url));
    }

    #[tokio::test]
    async fn test_claim_rejected_at_root_is_ignored() {
        let server = MockServer::start().await;
        let root = server.uri();

        Mock::given(method("GET"))
            .and(path("/game/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"rewards":[{"id":7,"price":"$0.00","available":true}]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/game/download_url"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"url":"{}/game/download/key123"}}"#,
                root
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/game/download/key123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<div class="claim_to_download_box warning_box">
                       <form action="{}/game/claim"><button>Claim</button></form>
                   </div>"#,
                root
            )))
            .mount(&server)
            .await;
        // Rejection: redirect back to the platform root.
        Mock::given(method("POST"))
            .and(path("/game/claim"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/", root).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>home</html>"))
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let mut session = Session::new("tok", HashSet::new());
        let mut state = RunState::new(100);
        let game_url = format!("{}/game", root);

        let outcome =
            evaluate_candidate(&fetcher, &mut session, &mut state, &root, &game_url).await;

        assert!(matches!(outcome, RewardOutcome::Failed(_)));
        assert!(state.ignore.contains(&game_url));
        assert!(!session.owns(&game_url));
    }
}
