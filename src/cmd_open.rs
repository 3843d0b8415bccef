//! `open` subcommand: search, then open the best hit in the browser.

use std::process::Command;

use tracing::{debug, warn};

use starsearch_config::Config;
use starsearch_protocols::Candidate;

use crate::register::{build_components, resolve_mode};

/// Search and open the top result's URL.
pub(crate) async fn handle_open(
    config: &Config,
    query: &str,
    mode: Option<&str>,
    weight: Option<f32>,
    print_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = resolve_mode(&config.search, mode, weight)?;
    let components = build_components(config).await?;

    debug!("Opening top hit for '{}' (mode={})", query, mode);
    let results = components.engine.search(query, mode, 1).await?;

    let Some(url) = top_url(&results) else {
        println!("No repositories found.");
        return Ok(());
    };

    println!("{}", url);
    if print_only {
        return Ok(());
    }

    let (program, args) = opener_command(url);
    match Command::new(program).args(&args).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            warn!("{} exited with {}", program, status);
            Ok(())
        }
        Err(e) => {
            warn!("Failed to launch {}: {}", program, e);
            Ok(())
        }
    }
}

/// URL of the first ranked candidate.
fn top_url(results: &[Candidate]) -> Option<&str> {
    results
        .first()
        .map(|candidate| candidate.metadata.url.as_str())
        .filter(|url| !url.is_empty())
}

/// Platform command that hands `url` to the default browser.
fn opener_command(url: &str) -> (&'static str, Vec<String>) {
    #[cfg(target_os = "macos")]
    {
        ("open", vec![url.to_string()])
    }

    #[cfg(target_os = "windows")]
    {
        // The empty string is the window title `start` expects first.
        (
            "cmd",
            vec!["/C".to_string(), "start".to_string(), String::new(), url.to_string()],
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("xdg-open", vec![url.to_string()])
    }
}
