use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use inbox_lib::config::{get_settings_path, Settings};
use inbox_lib::navigation::Route;

#[derive(Debug, Parser)]
#[command(name = "knowledge-inbox", version, about = "Ask questions about your saved notes and URLs")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:3000
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds to wait for an answer before giving up
    #[arg(long, value_name = "SECS")]
    query_timeout: Option<u64>,

    /// Seconds allowed for every other request
    #[arg(long, value_name = "SECS")]
    request_timeout: Option<u64>,

    /// Open this conversation on start
    #[arg(long, value_name = "ID")]
    conversation: Option<i64>,

    /// Settings file (default: ~/.knowledge-inbox/settings.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    save_config: bool,

    /// More logging on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref()).context("loading settings")?;
        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(secs) = self.query_timeout {
            settings.query_timeout_secs = secs;
        }
        if let Some(secs) = self.request_timeout {
            settings.request_timeout_secs = secs;
        }
        settings.validate().context("invalid command-line settings")?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    inbox_lib::init_logging(cli.verbose);

    let settings = cli.settings()?;
    if cli.save_config {
        let path = cli.config.clone().unwrap_or_else(get_settings_path);
        settings
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Saved settings to {}", path.display());
        return Ok(());
    }
    let route = match cli.conversation {
        Some(id) => Route::conversation(id),
        None => Route::home(),
    };
    inbox_lib::run(settings, route).await
}
