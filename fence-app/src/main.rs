use std::io;

use clap::Parser;
use tracing::debug;

use fence_app::cli::Cli;
use fence_app::config::AppConfig;
use fence_app::{app, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    logging::init_logging(config.logging.level.as_deref());
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }

    debug!(
        backend = %config.database.backend,
        db = %config.database.connection_string,
        "configuration loaded"
    );

    let mut stdout = io::stdout().lock();
    app::run(cli.command, &config, &mut stdout).await
}
