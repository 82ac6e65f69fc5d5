mod application;
mod logging;
mod presentation {
    pub mod cli;
}

use clap::Parser;
use droidport_core::Settings;
use droidport_core::error::Result;
use presentation::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    logging::init_logging(
        logging::flag_level(cli.verbose, cli.quiet),
        settings.log_level.as_deref(),
    )?;
    application::run(cli, settings).await
}
