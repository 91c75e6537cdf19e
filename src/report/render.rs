//! Fixed-width report rendering

use crate::crawler::Sale;
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Renders sale groups as text: one fixed-width header line per sale,
/// followed by its member URLs.
pub fn render_report(groups: &[Sale]) -> String {
    let mut out = String::new();
    for sale in groups {
        let _ = writeln!(
            out,
            "{:<50} {:<25} {:<25}",
            sale.url,
            fmt_time(sale.start),
            fmt_time(sale.end)
        );
        for game in &sale.games {
            out.push_str(game);
            out.push('\n');
        }
    }
    out
}

fn fmt_time(time: Option<NaiveDateTime>) -> String {
    match time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}
