//! Resumable sale-id crawler
//!
//! The platform assigns sales dense numeric ids, so the whole promotion
//! space can be scanned by walking `/s/{id}` from a persisted cursor.
//! Each run works one segment: resolve the id to its canonical sale URL
//! (cached per segment), skip ended and partial discounts, then claim or
//! log every member game. The cursor only ever moves forward; segment
//! logs are append-only, so a crash costs at most the in-flight segment.

use crate::claim::claim_direct;
use crate::extract::{full_discount, future_sale, game_cell_urls, sale_ended, GameCellKind};
use crate::session::Session;
use crate::state::SaleStatus;
use crate::storage::{SaleUrlCache, FUTURE_LOG, MISS_LOG, OWNED_FILE, SALES_LOG};
use crate::{url, Config, GleanError, Result};
use chrono::NaiveDateTime;
use std::collections::HashSet;

use super::{bootstrap, Fetcher};

/// A time-boxed promotion and its member games.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: u64,
    pub url: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub games: Vec<String>,
    pub status: SaleStatus,
}

/// Remote indexes of already-known active and upcoming free sales.
///
/// Members missing from both indexes get recorded in the mismatch log so
/// the upstream cache can be fixed.
#[derive(Debug, Default)]
pub struct SaleIndex {
    pub active: HashSet<String>,
    pub future: HashSet<String>,
}

impl SaleIndex {
    pub fn contains(&self, game_url: &str) -> bool {
        self.active.contains(game_url) || self.future.contains(game_url)
    }
}

/// Lines produced while scanning one segment, split by destination log.
#[derive(Debug, Default)]
pub struct SegmentLogs {
    /// Members that could not be claimed (post-claim verification failed).
    pub miss: Vec<String>,

    /// Members of not-yet-active sales, to claim on a later run.
    pub future: Vec<String>,

    /// Members absent from both remote sale indexes.
    pub mismatch: Vec<String>,
}

/// Scans a range of sale ids on behalf of one run.
pub struct SaleCrawler<'a> {
    pub fetcher: &'a Fetcher,
    pub session: &'a mut Session,
    pub index: &'a SaleIndex,
    pub root_url: &'a str,
}

impl<'a> SaleCrawler<'a> {
    /// Processes every id in `[start, end)`.
    ///
    /// Failures are isolated per sale: the id still counts as scanned and
    /// the cursor will advance past it.
    pub async fn scan_segment(
        &mut self,
        start: u64,
        end: u64,
        cache: &mut SaleUrlCache,
    ) -> SegmentLogs {
        let mut logs = SegmentLogs::default();
        for id in start..end {
            if id == 0 {
                // Sale 0 does not exist.
                continue;
            }
            if let Err(e) = self.process_sale(id, cache, &mut logs).await {
                tracing::warn!("Failure while checking sale {}: {}", id, e);
            }
        }
        logs
    }

    async fn process_sale(
        &mut self,
        id: u64,
        cache: &mut SaleUrlCache,
        logs: &mut SegmentLogs,
    ) -> Result<()> {
        let sale_url = self.resolve_sale_url(id, cache).await?;

        let page = self.fetcher.get(&sale_url).await?;
        if sale_ended(&page.body) {
            return Ok(());
        }
        if !full_discount(&page.body) {
            return Ok(());
        }

        let status = if future_sale(&page.body) {
            SaleStatus::Future
        } else {
            SaleStatus::Active
        };
        tracing::info!("Sale {} ({:?}): {}", id, status, sale_url);

        let sale = Sale {
            id,
            url: sale_url,
            start: None,
            end: None,
            games: game_cell_urls(&page.body, GameCellKind::SalePage),
            status,
        };
        self.handle_members(&sale, logs).await;
        Ok(())
    }

    /// Resolves a sale id to its canonical URL, reusing the segment cache.
    async fn resolve_sale_url(&self, id: u64, cache: &mut SaleUrlCache) -> Result<String> {
        if let Some(cached) = cache.get(id) {
            return Ok(cached.to_string());
        }

        let lookup = url::sale_lookup_url(self.root_url, id);
        let response = self.fetcher.get_no_redirect(&lookup).await?;
        let resolved = response.location.unwrap_or(lookup);
        cache.record(id, resolved.clone());
        Ok(resolved)
    }

    async fn handle_members(&mut self, sale: &Sale, logs: &mut SegmentLogs) {
        // Each log records the sale URL once, before its first member.
        let mut mismatch_started = false;
        let mut claim_log_started = false;

        for member in &sale.games {
            if !self.index.contains(member) {
                tracing::info!("Missing from sale index: {}", member);
                if !mismatch_started {
                    mismatch_started = true;
                    logs.mismatch.push(sale.url.clone());
                }
                logs.mismatch.push(member.clone());
            }

            if self.session.owns(member) {
                continue;
            }

            if sale.status == SaleStatus::Future {
                tracing::info!("Must claim later: {}", member);
                if !claim_log_started {
                    claim_log_started = true;
                    logs.future.push(sale.url.clone());
                }
                logs.future.push(member.clone());
                continue;
            }

            let outcome = claim_direct(self.fetcher, self.session, self.root_url, member).await;
            if !outcome.is_claimed() {
                tracing::info!("Not claimable: {}", member);
                if !claim_log_started {
                    claim_log_started = true;
                    logs.miss.push(sale.url.clone());
                }
                logs.miss.push(member.clone());
            }
        }
    }
}

/// Fetches the upper bound of the sale-id space from the remote index.
pub async fn fetch_sale_limit(fetcher: &Fetcher, limit_url: &str) -> Result<u64> {
    let response = fetcher.get(limit_url).await?;
    if !response.is_ok() {
        return Err(GleanError::Extract {
            url: limit_url.to_string(),
            message: format!("sale limit returned status {}", response.status),
        });
    }
    response
        .body
        .trim()
        .parse()
        .map_err(|_| GleanError::Extract {
            url: limit_url.to_string(),
            message: format!("sale limit is not an integer: {:?}", response.body.trim()),
        })
}

/// Downloads the remote active and upcoming sale caches.
pub async fn fetch_sale_index(
    fetcher: &Fetcher,
    active_url: &str,
    upcoming_url: &str,
) -> Result<SaleIndex> {
    let active = crate::claim::fetch_game_list(fetcher, active_url).await?;
    let future = crate::claim::fetch_game_list(fetcher, upcoming_url).await?;
    Ok(SaleIndex {
        active: active.into_iter().map(|g| g.url).collect(),
        future: future.into_iter().map(|g| g.url).collect(),
    })
}

/// Runs one segment of the sale crawl: load cursor, scan, persist.
pub async fn run_sale_pass(config: &Config) -> Result<()> {
    let (store, fetcher, mut session) = bootstrap(config)?;

    let pos = store.load_cursor()?;
    let limit = match config.crawler.sale_limit {
        Some(limit) => limit,
        None => fetch_sale_limit(&fetcher, &config.platform.sale_limit_url).await?,
    };
    if pos >= limit {
        tracing::info!("Cursor {} has reached the sale limit {}", pos, limit);
        return Ok(());
    }

    let index = fetch_sale_index(
        &fetcher,
        &config.platform.active_cache_url,
        &config.platform.upcoming_cache_url,
    )
    .await?;
    tracing::info!(
        "Sale index holds {} active and {} upcoming entries",
        index.active.len(),
        index.future.len()
    );

    let step = config.crawler.segment_step;
    let base = pos - pos % step;
    let end = (pos + step).min(limit);
    let mut cache = store.load_sale_url_cache(base)?;

    tracing::info!("Scanning sale ids {}..{}", pos, end);
    let mut crawler = SaleCrawler {
        fetcher: &fetcher,
        session: &mut session,
        index: &index,
        root_url: &config.platform.root_url,
    };
    let logs = crawler.scan_segment(pos, end, &mut cache).await;

    store.append_segment_log(base, MISS_LOG, &logs.miss)?;
    store.append_segment_log(base, FUTURE_LOG, &logs.future)?;
    store.append_segment_log(base, SALES_LOG, &logs.mismatch)?;
    store.save_sale_url_cache(&cache)?;
    store.save_cursor(end)?;
    store.save_set(OWNED_FILE, &session.owned().iter().cloned().collect())?;

    Ok(())
}
