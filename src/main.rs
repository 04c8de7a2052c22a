mod action;
mod app;
mod cli;
mod command;
mod components;
mod config;
mod error;
mod external;
mod forge;
mod input;
mod intent;
mod logging;
mod panels;
mod sections;
mod session;
mod util;

use color_eyre::eyre::Result;
use cli::Cli;
use config::{Config, ProjectDefaults};
use error::PhorgeError;
use forge::ForgeClient;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();
    let _log_guard = logging::init(&cli.log_level);

    // Configuration problems are the only fatal errors, reported before
    // the terminal is taken over. A missing key starts the setup prompt.
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(PhorgeError::MissingApiKey { path }) => {
            tracing::info!("No API key configured, starting setup");
            match app::run_setup(Config::load_from(&path)?, &path)? {
                Some(config) => config,
                None => return Ok(()),
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("phorge: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Starting phorge {}", env!("CARGO_PKG_VERSION"));

    let client = ForgeClient::new(&config.forge.base_url, &config.forge.api_key)?;
    let project_dir = std::env::current_dir()?;
    let defaults = ProjectDefaults::load(&project_dir).unwrap_or_else(|e| {
        tracing::warn!("Ignoring project defaults: {}", e);
        ProjectDefaults::default()
    });
    let mut app = app::App::new(config, client, defaults, project_dir)?;
    app.run()?;

    Ok(())
}
