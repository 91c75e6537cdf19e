//! Authenticated session handle
//!
//! Login and credential persistence are external concerns; the gleaner
//! consumes a ready session: the platform cookie (carried by the HTTP
//! client's cookie jar), the anti-forgery token required on state-changing
//! requests, and the set of already-owned game URLs. The owned set is the
//! only part the crawl mutates, growing as claims succeed.

use crate::{GleanError, Result};
use reqwest::cookie::Jar;
use std::collections::HashSet;
use std::sync::Arc;

/// The authenticated account state the crawlers operate on behalf of.
#[derive(Debug)]
pub struct Session {
    /// Anti-forgery token consumed by state-changing requests.
    pub csrf_token: String,

    /// URLs of games the account already owns.
    owned: HashSet<String>,
}

impl Session {
    pub fn new(csrf_token: impl Into<String>, owned: HashSet<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            owned,
        }
    }

    /// Membership test used by every candidate filter. Owned games are
    /// never handed to a claim machine.
    pub fn owns(&self, game_url: &str) -> bool {
        self.owned.contains(game_url)
    }

    /// Records a successful claim.
    pub fn record_owned(&mut self, game_url: &str) {
        self.owned.insert(game_url.to_string());
    }

    pub fn owned(&self) -> &HashSet<String> {
        &self.owned
    }

    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }
}

/// Builds the cookie jar carrying the session cookie.
///
/// `cookie` is the raw `name=value` pair of the platform session cookie;
/// it is scoped to the platform root so both the apex domain and creator
/// subdomains send it.
pub fn session_cookie_jar(cookie: &str, root_url: &str) -> Result<Arc<Jar>> {
    if cookie.trim().is_empty() || !cookie.contains('=') {
        return Err(GleanError::Session(format!(
            "Malformed session cookie: {:?}",
            cookie
        )));
    }

    let root: ::url::Url = root_url.parse()?;
    let host = root
        .host_str()
        .ok_or_else(|| GleanError::Session(format!("Root URL has no host: {}", root_url)))?;

    let jar = Jar::default();
    jar.add_cookie_str(
        &format!("{}; Domain=.{}; Path=/", cookie.trim(), host),
        &root,
    );
    Ok(Arc::new(jar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owns_and_record() {
        let mut session = Session::new("tok", HashSet::new());
        assert!(!session.owns("https://a.itch.io/game"));

        session.record_owned("https://a.itch.io/game");
        assert!(session.owns("https://a.itch.io/game"));
        assert_eq!(session.owned_count(), 1);
    }

    #[test]
    fn test_cookie_jar_accepts_pair() {
        assert!(session_cookie_jar("itchio=abc123", "https://itch.io").is_ok());
    }

    #[test]
    fn test_cookie_jar_rejects_garbage() {
        assert!(session_cookie_jar("", "https://itch.io").is_err());
        assert!(session_cookie_jar("no-equals-sign", "https://itch.io").is_err());
    }
}
