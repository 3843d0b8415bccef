//! Import subcommand handler.

use std::path::Path;

use tracing::info;

use starsearch_config::Config;
use starsearch_protocols::RepoRecord;

use crate::register::build_components;

/// Read a JSON array of repositories and publish a new index generation.
pub(crate) async fn handle_import(
    config: &Config,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = read_records(file).await?;
    info!("Importing {} repositories from {}", records.len(), file.display());

    let components = build_components(config).await?;
    let report = components.indexer.sync(records).await?;

    println!(
        "Indexed {} repositories (generation {}, dimension {})",
        report.repos, report.generation, report.dimension
    );
    Ok(())
}

async fn read_records(file: &Path) -> Result<Vec<RepoRecord>, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file).await?;
    let records: Vec<RepoRecord> = serde_json::from_str(&content)?;
    Ok(records)
}
