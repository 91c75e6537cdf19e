//! JSON payload shapes served by the platform API
//!
//! Typed deserialization replaces the original field probing: a payload
//! either matches one of these shapes or the affected item is marked
//! failed and the crawl moves on.

use serde::Deserialize;

/// Game metadata from `{game}/data.json`.
///
/// Games without a community-copy program simply omit the rewards section.
#[derive(Debug, Clone, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub rewards: Option<Vec<RewardTier>>,
}

/// One reward tier on a game page.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardTier {
    pub id: u64,

    /// Display price, currency symbol included ("$0.00", "€0.00").
    pub price: String,

    /// Whether copies remain claimable right now.
    #[serde(default)]
    pub available: bool,
}

/// Response of the `download_url` endpoint.
///
/// Exactly one of `url` / `errors` is populated in practice, but the
/// platform does not guarantee it, so both are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadResponse {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

/// One page of a collection feed (`?format=json&page=N`).
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage {
    pub num_items: u64,

    /// Rendered cell markup; game cells are extracted from it with the
    /// same rules as profile pages.
    #[serde(default)]
    pub content: String,
}

/// Error payloads that mean the download-url request hit a stale game URL
/// and a redirect resolution is worth one retry.
const INVALID_TARGET_ERRORS: [&str; 2] = ["invalid game", "invalid user"];

/// Returns true when the response reports a stale game or user reference.
pub fn is_invalid_target(response: &DownloadResponse) -> bool {
    response
        .errors
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|e| INVALID_TARGET_ERRORS.contains(&e.as_str()))
}

/// Classifies a display price as a free tier.
///
/// The price keeps whatever currency prefix the creator's locale renders,
/// so non-digit prefix characters are skipped before comparing; only an
/// exact remaining "0.00" qualifies.
pub fn is_free_price(price: &str) -> bool {
    let stripped: String = price
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .collect();
    stripped == "0.00"
}

/// Returns the free tiers of a game, in page order.
pub fn free_tiers(data: &GameData) -> Vec<&RewardTier> {
    data.rewards
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|tier| is_free_price(&tier.price))
        .collect()
}
