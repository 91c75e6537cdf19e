//! Sale-grouped report aggregation
//!
//! Crawl passes leave sharded logs behind (one directory per sale-id
//! segment). The aggregator reconstructs sale groups from those shards,
//! revalidates every member against the live site, orders the groups by
//! sale window, and renders one fixed-width report per category.

mod aggregate;
mod render;

pub use aggregate::{insert_ordered, ReportBuilder, ReportKind, ReportOrder};
pub use render::render_report;

use crate::crawler::bootstrap;
use crate::{Config, Result};

/// Rebuilds all three report categories from the segment logs on disk.
pub async fn run_report(config: &Config) -> Result<()> {
    let (store, fetcher, session) = bootstrap(config)?;

    let builder = ReportBuilder {
        fetcher: &fetcher,
        owned: session.owned(),
    };

    for kind in [ReportKind::Future, ReportKind::Miss, ReportKind::Mismatch] {
        let groups = builder.build(&store, kind).await?;
        tracing::info!("{:?} report: {} sale groups", kind, groups.len());

        if groups.is_empty() {
            continue;
        }
        let path = store.path(kind.file_name());
        std::fs::write(&path, render_report(&groups))?;
    }

    Ok(())
}
