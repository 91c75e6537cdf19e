//! itch.io URL grammar helpers
//!
//! This module centralizes every URL transformation the crawlers rely on:
//! creator subdomains, profile pages, sale ids, and the per-game API
//! endpoints. Keeping the grammar in one place means the discovery
//! crawlers never re-derive URLs ad hoc.

use url::Url;

/// The registrable platform host. Creator pages live on subdomains of it.
pub const PLATFORM_HOST: &str = "itch.io";

/// Extracts the creator subdomain root from a game URL.
///
/// `https://someone.itch.io/their-game` maps to `https://someone.itch.io`.
/// Returns `None` for URLs that are not on a creator subdomain (including
/// the platform root itself).
pub fn creator_profile(game_url: &str) -> Option<String> {
    let parsed = Url::parse(game_url).ok()?;
    let host = parsed.host_str()?;
    let user = host.strip_suffix(".itch.io")?;
    if user.is_empty() {
        return None;
    }
    Some(format!("https://{}.itch.io", user))
}

/// Maps a creator subdomain URL to its alternate profile-page form.
///
/// `https://someone.itch.io` maps to `https://itch.io/profile/someone`.
/// The two forms render the same catalogue but are tracked separately by
/// the profile crawler so each gets visited exactly once.
pub fn profile_page(creator_url: &str) -> Option<String> {
    let parsed = Url::parse(creator_url).ok()?;
    let host = parsed.host_str()?;
    let user = host.strip_suffix(".itch.io")?;
    if user.is_empty() {
        return None;
    }
    Some(format!("https://{}/profile/{}", PLATFORM_HOST, user))
}

/// Parses the numeric sale id out of a sale URL.
///
/// Sale URLs look like `https://itch.io/s/123456/spring-sale`; the id is
/// the first path segment after `/s/`. Only the path shape is checked,
/// so resolved sale URLs are recognized wherever they point.
pub fn sale_id(url: &str) -> Option<u64> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    if segments.next() != Some("s") {
        return None;
    }
    segments.next()?.parse().ok()
}

/// Returns true when a log line is a sale-URL marker rather than a member
/// game URL.
pub fn is_sale_url(line: &str) -> bool {
    sale_id(line.trim()).is_some()
}

/// Canonical short form of a sale URL, `https://itch.io/s/{id}`.
pub fn canonical_sale_url(id: u64) -> String {
    format!("https://{}/s/{}", PLATFORM_HOST, id)
}

/// The redirect-resolution endpoint for a numeric sale id.
pub fn sale_lookup_url(root: &str, id: u64) -> String {
    format!("{}/s/{}", root.trim_end_matches('/'), id)
}

/// The JSON metadata endpoint for a game page.
pub fn game_data_url(game_url: &str) -> String {
    format!("{}/data.json", game_url.trim_end_matches('/'))
}

/// The download-url request endpoint for a game.
///
/// The anti-forgery token rides in the query string the way the platform
/// expects it; `reward_id` is present only for reward-tier claims.
pub fn download_request_url(game_url: &str, csrf_token: &str, reward_id: Option<u64>) -> String {
    let base = format!(
        "{}/download_url?csrf_token={}",
        game_url.trim_end_matches('/'),
        csrf_token
    );
    match reward_id {
        Some(id) => format!("{}&reward_id={}", base, id),
        None => base,
    }
}

/// Appends the JSON pagination query to a collection URL.
pub fn collection_page_url(collection_url: &str, page: u32) -> String {
    let base = collection_url.trim_end_matches('/');
    if page <= 1 {
        format!("{}?format=json", base)
    } else {
        format!("{}?format=json&page={}", base, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_profile_from_game_url() {
        assert_eq!(
            creator_profile("https://someone.itch.io/their-game"),
            Some("https://someone.itch.io".to_string())
        );
    }

    #[test]
    fn test_creator_profile_rejects_platform_root() {
        assert_eq!(creator_profile("https://itch.io/s/1234/sale"), None);
    }

    #[test]
    fn test_creator_profile_rejects_other_hosts() {
        assert_eq!(creator_profile("https://example.com/game"), None);
    }

    #[test]
    fn test_profile_page_form() {
        assert_eq!(
            profile_page("https://someone.itch.io"),
            Some("https://itch.io/profile/someone".to_string())
        );
    }

    #[test]
    fn test_sale_id_with_slug() {
        assert_eq!(sale_id("https://itch.io/s/123456/spring-sale"), Some(123456));
    }

    #[test]
    fn test_sale_id_without_slug() {
        assert_eq!(sale_id("https://itch.io/s/42"), Some(42));
    }

    #[test]
    fn test_sale_id_rejects_game_urls() {
        assert_eq!(sale_id("https://someone.itch.io/their-game"), None);
        assert_eq!(sale_id("https://itch.io/profile/someone"), None);
    }

    #[test]
    fn test_is_sale_url_on_log_lines() {
        assert!(is_sale_url("https://itch.io/s/99999/holiday-sale"));
        assert!(!is_sale_url("https://someone.itch.io/their-game"));
    }

    #[test]
    fn test_game_data_url_trims_trailing_slash() {
        assert_eq!(
            game_data_url("https://someone.itch.io/their-game/"),
            "https://someone.itch.io/their-game/data.json"
        );
    }

    #[test]
    fn test_download_request_url_with_reward() {
        assert_eq!(
            download_request_url("https://someone.itch.io/g", "tok", Some(7)),
            "https://someone.itch.io/g/download_url?csrf_token=tok&reward_id=7"
        );
    }

    #[test]
    fn test_download_request_url_without_reward() {
        assert_eq!(
            download_request_url("https://someone.itch.io/g", "tok", None),
            "https://someone.itch.io/g/download_url?csrf_token=tok"
        );
    }

    #[test]
    fn test_collection_page_url_pagination() {
        assert_eq!(
            collection_page_url("https://itch.io/c/1/bundle", 1),
            "https://itch.io/c/1/bundle?format=json"
        );
        assert_eq!(
            collection_page_url("https://itch.io/c/1/bundle", 3),
            "https://itch.io/c/1/bundle?format=json&page=3"
        );
    }
}
