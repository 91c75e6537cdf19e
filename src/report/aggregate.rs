//! Log-segment scanning and sale-group reconstruction
//!
//! A segment log is a flat line sequence: a sale-URL line opens a group
//! and every following game line belongs to it, until the next sale URL.
//! Groups are ordered by sale start date as they complete — ascending
//! for upcoming sales (soonest first), descending for the rest (newest
//! first) — with a stable O(n) insertion per group.

use crate::crawler::{Fetcher, Sale};
use crate::extract::{password_protected, sale_window, unavailable};
use crate::state::SaleStatus;
use crate::storage::{FileStore, FUTURE_LOG, MISS_LOG, SALES_LOG};
use crate::{url, Result};
use std::collections::HashSet;

/// Which segment log a report is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Members that could not be claimed.
    Miss,

    /// Members of sales that had not started yet.
    Future,

    /// Members missing from the remote sale indexes.
    Mismatch,
}

impl ReportKind {
    /// Name of the per-segment log this report reads, which is also the
    /// name of the aggregated output file.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Miss => MISS_LOG,
            Self::Future => FUTURE_LOG,
            Self::Mismatch => SALES_LOG,
        }
    }

    /// Upcoming sales read best soonest-first; everything else newest-first.
    pub fn order(&self) -> ReportOrder {
        match self {
            Self::Future => ReportOrder::Ascending,
            Self::Miss | Self::Mismatch => ReportOrder::Descending,
        }
    }

    /// Owned games are dropped from claimable categories; the mismatch
    /// report keeps them, since it documents the index gap either way.
    pub fn checks_owned(&self) -> bool {
        matches!(self, Self::Miss | Self::Future)
    }

    fn status(&self) -> SaleStatus {
        match self {
            Self::Future => SaleStatus::Future,
            Self::Miss | Self::Mismatch => SaleStatus::Active,
        }
    }
}

/// Sort direction for group insertion, keyed on the sale start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOrder {
    Ascending,
    Descending,
}

/// Inserts a completed group at the first position where the ordering
/// predicate holds against the existing entry. Stable: groups with equal
/// (or unknown) start dates keep their completion order.
pub fn insert_ordered(groups: &mut Vec<Sale>, sale: Sale, order: ReportOrder) {
    let position = groups
        .iter()
        .position(|existing| match order {
            ReportOrder::Ascending => sale.start < existing.start,
            ReportOrder::Descending => sale.start > existing.start,
        })
        .unwrap_or(groups.len());
    groups.insert(position, sale);
}

/// Rebuilds sale groups of one category from every segment on disk.
pub struct ReportBuilder<'a> {
    pub fetcher: &'a Fetcher,
    pub owned: &'a HashSet<String>,
}

impl<'a> ReportBuilder<'a> {
    pub async fn build(&self, store: &FileStore, kind: ReportKind) -> Result<Vec<Sale>> {
        let mut groups = Vec::new();
        for base in store.segment_bases()? {
            let Some(lines) = store.read_segment_log(base, kind.file_name())? else {
                continue;
            };
            self.collect(&lines, kind, &mut groups).await;
        }
        Ok(groups)
    }

    async fn collect(&self, lines: &[String], kind: ReportKind, groups: &mut Vec<Sale>) {
        let mut current: Option<Sale> = None;

        for line in lines {
            if url::is_sale_url(line) {
                Self::flush(&mut current, groups, kind.order());
                current = Some(self.open_group(line, kind).await);
                continue;
            }

            // Member lines before any sale marker have no home; the log
            // was truncated and the orphans are dropped.
            let Some(sale) = current.as_mut() else {
                tracing::warn!("Orphan member line in {} log: {}", kind.file_name(), line);
                continue;
            };

            if kind.checks_owned() && self.owned.contains(line) {
                continue;
            }
            if self.member_alive(line).await {
                sale.games.push(line.clone());
            }
        }

        Self::flush(&mut current, groups, kind.order());
    }

    /// Starts a group, reading the sale window from the live sale page.
    async fn open_group(&self, sale_line: &str, kind: ReportKind) -> Sale {
        let id = url::sale_id(sale_line).unwrap_or(0);

        let (start, end) = match self.fetcher.get(sale_line).await {
            Ok(response) if response.is_ok() => sale_window(&response.body),
            Ok(response) => {
                tracing::warn!("Sale page {} returned status {}", sale_line, response.status);
                (None, None)
            }
            Err(e) => {
                tracing::warn!("Failed to check {}: {}", sale_line, e);
                (None, None)
            }
        };

        Sale {
            id,
            url: url::canonical_sale_url(id),
            start,
            end,
            games: Vec::new(),
            status: kind.status(),
        }
    }

    /// Revalidates a member against the live site.
    async fn member_alive(&self, game_url: &str) -> bool {
        let response = match self.fetcher.get(game_url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to check {}: {}", game_url, e);
                return false;
            }
        };
        response.is_ok()
            && !password_protected(&response.body)
            && !unavailable(&response.body)
    }

    /// Groups that lost every member are dropped rather than rendered.
    fn flush(current: &mut Option<Sale>, groups: &mut Vec<Sale>, order: ReportOrder) {
        if let Some(sale) = current.take() {
            if !sale.games.is_empty() {
                insert_ordered(groups, sale, order);
            }
        }
    }
}
