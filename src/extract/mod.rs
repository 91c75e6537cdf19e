//! Named extraction rules for platform markup and JSON payloads
//!
//! Every selector and marker string the crawlers depend on lives here, so
//! extraction behavior can be audited (and changed) in one place.

pub mod html;
pub mod meta;

pub use html::{
    claim_form_action, full_discount, future_sale, game_cell_urls, nothing_available,
    password_protected, promotion_over, sale_ended, sale_window, unavailable, GameCellKind,
};
pub use meta::{
    free_tiers, is_free_price, is_invalid_target, CollectionPage, DownloadResponse, GameData,
    RewardTier,
};
