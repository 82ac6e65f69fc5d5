pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use droidport_core::Settings;
use droidport_core::error::Result;

pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    match cli.command {
        Commands::Devices => handlers::handle_devices(&settings).await,
        Commands::Catalog { backup } => handlers::handle_catalog(backup).await,
        Commands::Notes { backup, json } => handlers::handle_notes(backup, json).await,
        Commands::Map { bundle_id, mapping } => {
            handlers::handle_map(&settings, &bundle_id, mapping)
        }
        Commands::Restore {
            backup,
            serial,
            mirror,
            mapping,
            categories,
            json,
        } => {
            handlers::handle_restore(&settings, handlers::RestoreRequest {
                backup,
                serial,
                mirror,
                mapping,
                categories,
                json,
            })
            .await
        }
    }
}
