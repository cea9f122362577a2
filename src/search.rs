//! `dix query`: top-k retrieval from the command line.

use anyhow::Result;

use crate::config::Config;
use crate::index::IndexStore;

pub async fn run_query(config: &Config, query: &str, k: Option<usize>) -> Result<()> {
    let index = IndexStore::open(config).await?;
    let k = k.unwrap_or(config.retrieval.top_k);

    let hits = match index.query(query, k).await {
        Ok(hits) => hits,
        Err(e) if e.is_empty_index() => {
            println!("Index is empty. Ingest a document first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let location = match hit.provenance.page {
            Some(page) => format!("{} p.{}", hit.provenance.source, page),
            None => hit.provenance.source.clone(),
        };
        println!("{}. [{:.4}] {}", i + 1, hit.score, location);
        println!("    offset: {}", hit.provenance.offset);
        println!("    excerpt: \"{}\"", excerpt(&hit.text, 160));
        println!();
    }

    Ok(())
}

/// First `max_chars` characters of `text` on a single line.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let trimmed = flat.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_flattens_and_truncates() {
        assert_eq!(excerpt("  one\ntwo  ", 20), "one two");
        assert_eq!(excerpt("abcdef", 3), "abc…");
        assert_eq!(excerpt("日本語テキスト", 3), "日本語…");
    }
}
