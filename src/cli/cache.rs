//! Cache management commands

use std::path::Path;

use crate::cache::CacheStorage;
use crate::cache::storage::{CacheStats, ClearStats};
use crate::error::Result;

/// Show cache status/statistics
pub fn status() -> Result<()> {
    let cache = CacheStorage::open()?;
    let stats = cache.stats()?;
    print!("{}", render_status(cache.root(), &stats));
    Ok(())
}

/// Clear all cache entries
pub fn clear() -> Result<()> {
    let cache = CacheStorage::open()?;
    let stats = cache.clear_all()?;
    println!("{}", render_clear(&stats));
    Ok(())
}

pub fn render_status(root: &Path, stats: &CacheStats) -> String {
    let mut text = String::new();
    text.push_str("Cache Status\n");
    text.push_str("────────────────────────────────────────\n");
    text.push_str(&format!("Location:       {}\n", root.display()));
    text.push_str(&format!("Valid entries:  {}\n", stats.valid_entries));
    text.push_str(&format!("Expired:        {}\n", stats.expired_entries));
    text.push_str(&format!("Total size:     {}\n", format_size(stats.total_size_bytes)));

    if let Some(oldest) = stats.oldest_entry {
        text.push_str(&format!("Oldest entry:   {}\n", format_timestamp(oldest)));
    }
    if let Some(newest) = stats.newest_entry {
        text.push_str(&format!("Newest entry:   {}\n", format_timestamp(newest)));
    }
    text
}

pub fn render_clear(stats: &ClearStats) -> String {
    if stats.entries_removed > 0 {
        format!("Cleared {} cache entries", stats.entries_removed)
    } else {
        "Cache was already empty".to_string()
    }
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|d| {
            d.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format bytes as human-readable size
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
