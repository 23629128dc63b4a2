pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod render;
pub mod repl;
pub mod state;
pub mod toast;
pub mod validation;
pub mod views;

use config::Settings;
use navigation::Route;
use state::AppState;

/// Logs go to stderr so they never interleave with rendered pages on stdout.
/// `RUST_LOG` overrides the level picked here.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 if cfg!(debug_assertions) => log::LevelFilter::Info,
        // Also log in release mode but only warnings
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

pub async fn run(settings: Settings, initial_route: Route) -> anyhow::Result<()> {
    log::info!(
        "Starting against {} (query timeout {}s)",
        settings.api_base_url,
        settings.query_timeout_secs
    );
    let state = AppState::new(settings, initial_route)?;
    repl::run(state).await?;
    Ok(())
}
