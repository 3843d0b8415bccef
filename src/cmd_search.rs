//! Search and status subcommand handlers.

use tracing::debug;

use starsearch_config::Config;
use starsearch_protocols::Candidate;

use crate::register::{build_components, resolve_mode};

const DESCRIPTION_WIDTH: usize = 50;

/// Run one query and print the results.
pub(crate) async fn handle_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    mode: Option<&str>,
    weight: Option<f32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = resolve_mode(&config.search, mode, weight)?;
    let limit = config.search.effective_limit(limit);
    let components = build_components(config).await?;

    debug!("Searching '{}' (mode={}, limit={})", query, mode, limit);
    let results = components.engine.search(query, mode, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    print!("{}", render_table(&results));
    Ok(())
}

/// Print index status.
pub(crate) async fn handle_status(
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let components = build_components(config).await?;
    let status = components.engine.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let generation = status
        .generation
        .map(|g| g.to_string())
        .unwrap_or_else(|| "none (run import first)".to_string());
    let last_sync = status
        .last_sync
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    println!("Repositories:    {}", status.total_repos);
    println!("Indexed vectors: {}", status.indexed_vectors);
    println!("Generation:      {}", generation);
    println!("Dimension:       {}", status.dimension);
    println!("Last sync:       {}", last_sync);
    Ok(())
}

fn render_table(results: &[Candidate]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<35} {:<52} {:<12} {:>7} {:>6}\n",
        "NAME", "DESCRIPTION", "LANGUAGE", "STARS", "SIM"
    ));
    out.push_str(&format!("{}\n", "-".repeat(116)));

    for result in results {
        let meta = &result.metadata;
        let description = truncate(meta.description.as_deref().unwrap_or("-"), DESCRIPTION_WIDTH);
        let language = meta.language.as_deref().unwrap_or("-");
        let similarity = result
            .score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<35} {:<52} {:<12} {:>7} {:>6}\n",
            meta.full_name, description, language, meta.popularity, similarity
        ));
    }
    out
}

/// Cut `text` to `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use starsearch_protocols::RepoMetadata;

    fn candidate(name: &str, description: Option<&str>, score: Option<f32>) -> Candidate {
        let metadata = RepoMetadata {
            entity_id: 1,
            full_name: name.to_string(),
            description: description.map(str::to_string),
            url: format!("https://github.com/{}", name),
            language: None,
            topics: vec![],
            popularity: 42,
        };
        match score {
            Some(s) => Candidate::vector(metadata, s),
            None => Candidate::lexical(metadata),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        let long = "x".repeat(80);
        let cut = truncate(&long, 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "数据库".repeat(30);
        assert_eq!(truncate(&text, 10).chars().count(), 10);
    }

    #[test]
    fn test_render_table_lexical_shows_dash() {
        let table = render_table(&[candidate("a/b", None, None)]);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("a/b"));
        assert!(row.trim_end().ends_with('-'));
        assert!(row.contains("42"));
    }

    #[test]
    fn test_render_table_vector_shows_similarity() {
        let table = render_table(&[candidate("a/b", Some("graph db"), Some(0.9123))]);
        assert!(table.contains("0.912"));
        assert!(table.contains("graph db"));
    }
}
