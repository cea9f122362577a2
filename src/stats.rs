//! Index statistics.
//!
//! A quick summary of what's indexed, used by `dix stats` to confirm that
//! ingestion is landing where expected.

use anyhow::Result;

use crate::config::Config;
use crate::index::IndexStore;

/// Run the stats command: open the index and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let index = IndexStore::open(config).await?;
    let stats = index.stats().await?;
    let params = config.chunking.params()?;

    let db_size = std::fs::metadata(&config.store.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("docindex index stats");
    println!("====================");
    println!();
    println!("  Store:       {}", config.store.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Entries:     {}", stats.entries);
    println!("  Sources:     {}", stats.sources);
    match stats.space {
        Some(space) => println!("  Embedding:   {} ({} dims)", space.model, space.dims),
        None => println!("  Embedding:   (not recorded yet)"),
    }
    if config.embedding.is_enabled() {
        println!("  Provider:    {}", index.provider().space());
    } else {
        println!("  Provider:    disabled");
    }
    println!(
        "  Chunking:    {} chars, {} overlap",
        params.max_chars(),
        params.overlap_chars()
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
