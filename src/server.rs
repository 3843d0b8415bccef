//! Tracing initialization and server startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use starsearch_config::{Config, LoggingConfig};

use crate::api::{create_router, ApiState};
use crate::register::build_components;

/// Initialize tracing with console and optional file output.
///
/// `RUST_LOG` overrides `logging.level`. Log files rotate daily under
/// `logging.directory`, or `<data_dir>/logs` when unset.
pub(crate) fn init_tracing(
    logging: &LoggingConfig,
    data_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if logging.file {
        let log_dir = logging
            .directory
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
            .unwrap_or_else(|| data_dir.join("logs"));
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("starsearch")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&log_dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The worker flushes on drop, so the guard lives as long as the process.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Serve the JSON API until the process is stopped.
pub(crate) async fn run_server(
    config: Config,
    host: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting starsearch v{}", env!("CARGO_PKG_VERSION"));

    let components = build_components(&config).await?;
    let state = ApiState {
        engine: components.engine,
        search: Arc::new(config.search.clone()),
    };
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Search API listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
