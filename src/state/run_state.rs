//! Run-scoped accumulation state
//!
//! All URL sets and counters a crawl pass mutates live in one `RunState`
//! value with a run-bounded lifetime. The sets are loaded from disk at run
//! start, mutated through the methods here (which maintain the set
//! invariants), and rewritten at run end.

use std::collections::{BTreeSet, HashSet};

/// Mutable state of one crawl-and-claim run.
///
/// # Invariants
///
/// * `ignore` and `active` are disjoint at all times: `mark_ignored` and
///   `mark_active` each remove the URL from the opposite set.
/// * `profiles` holds each creator URL at most once (`BTreeSet`).
/// * After `reconcile_owned`, `active` contains no owned game.
#[derive(Debug, Default)]
pub struct RunState {
    /// Games permanently skipped (no free tier, claim failed).
    pub ignore: BTreeSet<String>,

    /// Games with a free tier worth revisiting (claimed or out of copies).
    pub active: BTreeSet<String>,

    /// Every creator URL discovered so far.
    pub profiles: BTreeSet<String>,

    /// Creator subdomain URLs visited this run.
    checked: HashSet<String>,

    /// Profile-page-form URLs visited this run.
    checked_alt: HashSet<String>,

    /// Requests spent against the per-run ceiling.
    pub scrape_count: u32,

    /// Cooperative per-run request ceiling.
    pub scrape_limit: u32,
}

impl RunState {
    pub fn new(scrape_limit: u32) -> Self {
        Self {
            scrape_limit,
            ..Self::default()
        }
    }

    /// Records a game as worth revisiting, removing any ignore entry.
    pub fn mark_active(&mut self, url: &str) {
        self.ignore.remove(url);
        self.active.insert(url.to_string());
    }

    /// Records a game as permanently skipped, removing any active entry.
    pub fn mark_ignored(&mut self, url: &str) {
        self.active.remove(url);
        self.ignore.insert(url.to_string());
    }

    /// Adds a creator URL to the profile set. Returns true when new.
    pub fn note_profile(&mut self, url: &str) -> bool {
        self.profiles.insert(url.to_string())
    }

    /// Returns true when a candidate needs no further evaluation.
    pub fn is_known(&self, url: &str) -> bool {
        self.active.contains(url) || self.ignore.contains(url)
    }

    /// Drops owned games from the active set.
    ///
    /// Ignored games are also dropped from active in case the two sets
    /// drifted apart in files edited outside a run; the ignore entry wins.
    pub fn reconcile_owned(&mut self, owned: &HashSet<String>) {
        let ignore = &self.ignore;
        self.active
            .retain(|url| !owned.contains(url) && !ignore.contains(url));
    }

    /// Marks one addressing form of a profile as visited this run.
    ///
    /// Returns false when that form was already visited.
    pub fn mark_checked(&mut self, url: &str, alt: bool) -> bool {
        if alt {
            self.checked_alt.insert(url.to_string())
        } else {
            self.checked.insert(url.to_string())
        }
    }

    /// Returns true when the given addressing form was already visited.
    pub fn is_checked(&self, url: &str, alt: bool) -> bool {
        if alt {
            self.checked_alt.contains(url)
        } else {
            self.checked.contains(url)
        }
    }

    /// Spends one request against the per-run ceiling.
    pub fn count_request(&mut self) {
        self.scrape_count += 1;
    }

    /// Cooperative cutoff check; callers stop starting new work once true.
    pub fn budget_exhausted(&self) -> bool {
        self.scrape_count >= self.scrape_limit
    }
}
