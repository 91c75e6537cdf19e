//! HTML extraction rules for sale, game, and profile pages
//!
//! Structured extraction goes through `scraper` selectors. A handful of
//! checks remain plain-text markers because the page offers no structure
//! around them (status banners rendered as loose text); the marker strings
//! are kept byte-identical to what the platform serves so extraction
//! behavior stays verifiable against live pages.

use chrono::NaiveDateTime;
use scraper::{Html, Selector};

/// Body marker on sale pages whose window has already closed.
const SALE_ENDED_MARKER: &str = "This sale ended";

/// Discount banner fragment present only on 100%-off sales.
const FULL_DISCOUNT_MARKER: &str = "100%</strong> off";

/// Body marker on the platform root after a claim whose promotion expired.
const PROMOTION_OVER_MARKER: &str = "promotion is no longer active";

/// Body marker on password-gated pages.
const PASSWORD_MARKER: &str = "A password is required to view this page";

/// Body markers on delisted store pages.
const UNAVAILABLE_MARKERS: [&str; 2] = [
    "<p>This asset pack is currently unavailable</p>",
    "<p>This game is currently unavailable</p>",
];

/// Body marker on download pages with no uploaded files yet.
const NOTHING_AVAILABLE_MARKER: &str = "Nothing is available for download yet.";

/// Which flavor of game cell to scan for.
///
/// Sale pages render members as `game_cell_data` cells; profile pages and
/// collection content render `game_cell` cover cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCellKind {
    SalePage,
    ProfilePage,
}

impl GameCellKind {
    fn selector(&self) -> &'static str {
        match self {
            Self::SalePage => "div.game_cell_data",
            Self::ProfilePage => "div.game_cell",
        }
    }
}

/// Returns true when the sale page reports its window already ended.
pub fn sale_ended(body: &str) -> bool {
    body.contains(SALE_ENDED_MARKER)
}

/// Returns true when the sale page carries the 100%-off discount banner.
pub fn full_discount(body: &str) -> bool {
    body.contains(FULL_DISCOUNT_MARKER)
}

/// Returns true when the body is the expired-promotion notice.
pub fn promotion_over(body: &str) -> bool {
    body.contains(PROMOTION_OVER_MARKER)
}

/// Returns true when the page is password-gated.
pub fn password_protected(body: &str) -> bool {
    body.contains(PASSWORD_MARKER)
}

/// Returns true when the store page is delisted.
pub fn unavailable(body: &str) -> bool {
    UNAVAILABLE_MARKERS.iter().any(|m| body.contains(m))
}

/// Returns true when the download page has no files to offer yet.
pub fn nothing_available(body: &str) -> bool {
    body.contains(NOTHING_AVAILABLE_MARKER)
}

/// Returns true when the sale page carries the not-yet-active notification.
pub fn future_sale(body: &str) -> bool {
    let document = Html::parse_document(body);
    match Selector::parse(".not_active_notification") {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// Extracts the member game URLs from a sale or profile page.
///
/// Each cell contributes the href of its first anchor (the title link).
/// Cells without an anchor are skipped.
pub fn game_cell_urls(body: &str, kind: GameCellKind) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut urls = Vec::new();

    let (Ok(cell_selector), Ok(link_selector)) =
        (Selector::parse(kind.selector()), Selector::parse("a[href]"))
    else {
        return urls;
    };

    for cell in document.select(&cell_selector) {
        if let Some(link) = cell.select(&link_selector).next() {
            if let Some(href) = link.value().attr("href") {
                urls.push(href.to_string());
            }
        }
    }
    urls
}

/// Locates the claim confirmation form on a download page.
///
/// The claim box is the `claim_to_download_box warning_box` div; its form
/// action is the claim submission endpoint. Returns `None` when the page
/// has no claim box (the item downloads without claiming).
pub fn claim_form_action(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let box_selector = Selector::parse("div.claim_to_download_box.warning_box").ok()?;
    let form_selector = Selector::parse("form[action]").ok()?;

    let claim_box = document.select(&box_selector).next()?;
    let form = claim_box.select(&form_selector).next()?;
    form.value().attr("action").map(str::to_string)
}

/// Reads the sale window out of the JSON blob embedded in a sale page.
///
/// Sale pages inline their metadata as `"start_date":"..."` and
/// `"end_date":"..."` fields inside a script block; there is no element
/// structure to select on, so the fields are located by marker.
pub fn sale_window(body: &str) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let start = between(body, "\"start_date\":\"", "\"").and_then(parse_timestamp);
    let end = between(body, "\"end_date\":\"", "\"").and_then(parse_timestamp);
    (start, end)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Returns the text between `open` and the next `close` after it.
fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(&text[start..end])
}
